//! Image-to-PDF conversion
//!
//! Each image becomes one page, sized to the image at 72 dpi, with the
//! pixels embedded as a Flate-compressed DeviceRGB XObject.

use crate::error::PdfDeskError;
use crate::page_tree::PageWriter;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{Dictionary, Object, Stream};
use std::io::Write;

/// An uploaded image: the name is only used in error messages.
#[derive(Debug, Clone)]
pub struct ImageInput {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl ImageInput {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// Build a PDF with one page per image, in input order.
pub fn images_to_pdf(images: &[ImageInput]) -> Result<Vec<u8>, PdfDeskError> {
    if images.is_empty() {
        return Err(PdfDeskError::NoInput("No valid images were uploaded".into()));
    }

    let mut writer = PageWriter::new();

    for input in images {
        let decoded = image::load_from_memory(&input.bytes)
            .map_err(|e| PdfDeskError::ImageError(format!("{}: {}", input.name, e)))?;
        let rgb = decoded.to_rgb8();
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return Err(PdfDeskError::ImageError(format!(
                "{}: image has no pixels",
                input.name
            )));
        }

        let compressed = deflate(rgb.as_raw())?;
        let image_dict = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"XObject".to_vec())),
            ("Subtype", Object::Name(b"Image".to_vec())),
            ("Width", Object::Integer(width as i64)),
            ("Height", Object::Integer(height as i64)),
            ("ColorSpace", Object::Name(b"DeviceRGB".to_vec())),
            ("BitsPerComponent", Object::Integer(8)),
            ("Filter", Object::Name(b"FlateDecode".to_vec())),
        ]);
        let image_id = writer.add_object(Stream::new(image_dict, compressed));

        let (w, h) = (width as f32, height as f32);
        let content = format!("q\n{} 0 0 {} 0 0 cm\n/Im0 Do\nQ\n", w, h).into_bytes();

        let xobjects = Dictionary::from_iter(vec![("Im0", Object::Reference(image_id))]);
        let resources = Dictionary::from_iter(vec![("XObject", Object::Dictionary(xobjects))]);
        writer.add_page(w, h, content, resources);

        tracing::debug!(image = %input.name, width, height, "Embedded image page");
    }

    writer.finish()
}

fn deflate(raw: &[u8]) -> Result<Vec<u8>, PdfDeskError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(raw)
        .and_then(|_| encoder.finish())
        .map_err(|e| PdfDeskError::OperationError(format!("Image compression failed: {}", e)))
}
