use crate::edit::{edit_pages_with_policy, PageEdits};
use crate::error::PdfDeskError;
use crate::images::{images_to_pdf, ImageInput};
use crate::merge::merge_documents;
use crate::ranges::OutOfRangePolicy;
use crate::split::split_document_with_policy;
use crate::text::{render_text_document, TextLayout};
use std::time::Instant;

/// One unit of work for the transformer, owning its inputs so it can be
/// moved onto a blocking thread.
#[derive(Debug, Clone)]
pub enum PdfCommand {
    Merge {
        files: Vec<Vec<u8>>,
    },
    Split {
        file: Vec<u8>,
        pages: Vec<u32>,
        policy: OutOfRangePolicy,
    },
    EditPages {
        file: Vec<u8>,
        edits: PageEdits,
        policy: OutOfRangePolicy,
    },
    ImagesToPdf {
        images: Vec<ImageInput>,
    },
    RenderText {
        text: String,
        layout: TextLayout,
    },
}

#[derive(Debug, Clone)]
pub struct ProcessResult {
    pub data: Vec<u8>,
    pub metrics: ProcessMetrics,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessMetrics {
    pub input_size_bytes: usize,
    pub output_size_bytes: usize,
    pub page_count: u32,
    pub processing_time_ms: u64,
}

impl PdfCommand {
    pub fn name(&self) -> &'static str {
        match self {
            PdfCommand::Merge { .. } => "merge",
            PdfCommand::Split { .. } => "split",
            PdfCommand::EditPages { .. } => "edit_pages",
            PdfCommand::ImagesToPdf { .. } => "img2pdf",
            PdfCommand::RenderText { .. } => "text_edit",
        }
    }

    fn input_size(&self) -> usize {
        match self {
            PdfCommand::Merge { files } => files.iter().map(Vec::len).sum(),
            PdfCommand::Split { file, .. } | PdfCommand::EditPages { file, .. } => file.len(),
            PdfCommand::ImagesToPdf { images } => images.iter().map(|i| i.bytes.len()).sum(),
            PdfCommand::RenderText { text, .. } => text.len(),
        }
    }

    /// Run the command to completion. This is synchronous and CPU-bound.
    pub fn execute(self) -> Result<ProcessResult, PdfDeskError> {
        let start = Instant::now();
        let input_size_bytes = self.input_size();

        let data = match self {
            PdfCommand::Merge { files } => merge_documents(files)?,
            PdfCommand::Split {
                file,
                pages,
                policy,
            } => split_document_with_policy(&file, &pages, policy)?,
            PdfCommand::EditPages {
                file,
                edits,
                policy,
            } => edit_pages_with_policy(&file, &edits, policy)?,
            PdfCommand::ImagesToPdf { images } => images_to_pdf(&images)?,
            PdfCommand::RenderText { text, layout } => render_text_document(&text, &layout)?,
        };

        let metrics = ProcessMetrics {
            input_size_bytes,
            output_size_bytes: data.len(),
            page_count: crate::get_page_count(&data)?,
            processing_time_ms: start.elapsed().as_millis() as u64,
        };

        Ok(ProcessResult { data, metrics })
    }
}
