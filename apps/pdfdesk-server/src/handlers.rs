//! Request handlers
//!
//! Every POST handler runs its work in a fallible `run_*` function and hands
//! the outcome to [`finish`]: success is a download (or the editor page), any
//! [`AppError`] becomes a flash message and a 303 back to the form.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use pdfdesk_core::{parse_pages, ImageInput, PageEdits, PdfCommand, TextLayout};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

use crate::error::AppError;
use crate::flash;
use crate::scratch::ScratchDir;
use crate::state::AppState;
use crate::upload::{self, FilePart, UploadForm, UploadedFile, ALLOWED_IMAGES, ALLOWED_PDF};
use crate::views;

const MERGE_ERROR: &str = "Error merging PDFs";
const SPLIT_ERROR: &str = "Error splitting PDF";
const IMAGES_ERROR: &str = "Error converting images";
const EDIT_ERROR: &str = "Error editing PDF pages";
const EXTRACT_ERROR: &str = "Error reading PDF text";
const REBUILD_ERROR: &str = "Error creating edited PDF";

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "pdfdesk-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn index(session: Session) -> Html<String> {
    Html(views::index(&flash::take(&session).await))
}

pub async fn merge_form(session: Session) -> Html<String> {
    Html(views::merge(&flash::take(&session).await))
}

pub async fn split_form(session: Session) -> Html<String> {
    Html(views::split(&flash::take(&session).await))
}

pub async fn img2pdf_form(session: Session) -> Html<String> {
    Html(views::img2pdf(&flash::take(&session).await))
}

pub async fn edit_pages_form(session: Session) -> Html<String> {
    Html(views::edit_pages(&flash::take(&session).await))
}

pub async fn text_editor_form(session: Session) -> Html<String> {
    Html(views::text_upload(&flash::take(&session).await))
}

pub async fn merge(
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Response {
    let result = run_merge(&state, multipart).await;
    finish(&session, "/merge", result).await
}

async fn run_merge(state: &AppState, multipart: Multipart) -> Result<Response, AppError> {
    let form = upload::read_form(multipart).await?;
    let parts = form.files("pdf_files");
    if parts.is_empty() {
        return Err(AppError::validation("Please select at least two PDF files."));
    }

    let scratch = ScratchDir::create(&state.upload_dir).await?;
    let files = scratch.store_allowed(&parts, ALLOWED_PDF).await?;
    if files.is_empty() {
        return Err(AppError::validation("No valid PDF files were uploaded."));
    }
    log_stored(&files);

    let command = PdfCommand::Merge {
        files: files.into_iter().map(|f| f.bytes).collect(),
    };
    let output = state.execute(MERGE_ERROR, command).await?;
    scratch.write_output("merge", &output.data).await?;

    Ok(download("merged_output.pdf", output.data))
}

pub async fn split(
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Response {
    let result = run_split(&state, multipart).await;
    finish(&session, "/split", result).await
}

async fn run_split(state: &AppState, multipart: Multipart) -> Result<Response, AppError> {
    let form = upload::read_form(multipart).await?;
    let part = single_pdf(&form)?;
    let pages = parse_pages(form.text("pages")).map_err(|e| AppError::from_core(SPLIT_ERROR, e))?;
    if pages.is_empty() {
        return Err(AppError::validation("Please enter pages (e.g. 1-3,5)."));
    }

    let scratch = ScratchDir::create(&state.upload_dir).await?;
    let file = store_single(&scratch, part).await?;

    let command = PdfCommand::Split {
        file: file.bytes,
        pages,
        policy: state.page_policy,
    };
    let output = state.execute(SPLIT_ERROR, command).await?;
    scratch.write_output("split", &output.data).await?;

    Ok(download("split_output.pdf", output.data))
}

pub async fn img2pdf(
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Response {
    let result = run_img2pdf(&state, multipart).await;
    finish(&session, "/img2pdf", result).await
}

async fn run_img2pdf(state: &AppState, multipart: Multipart) -> Result<Response, AppError> {
    let form = upload::read_form(multipart).await?;
    let parts = form.files("images");
    if parts.is_empty() {
        return Err(AppError::validation("Please select at least one image."));
    }

    let scratch = ScratchDir::create(&state.upload_dir).await?;
    let files = scratch.store_allowed(&parts, ALLOWED_IMAGES).await?;
    if files.is_empty() {
        return Err(AppError::validation("No valid images were uploaded."));
    }
    log_stored(&files);

    let command = PdfCommand::ImagesToPdf {
        images: files
            .into_iter()
            .map(|f| ImageInput::new(f.original_name, f.bytes))
            .collect(),
    };
    let output = state.execute(IMAGES_ERROR, command).await?;
    scratch.write_output("img2pdf", &output.data).await?;

    Ok(download("images_output.pdf", output.data))
}

pub async fn edit_pages(
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Response {
    let result = run_edit_pages(&state, multipart).await;
    finish(&session, "/edit_pages", result).await
}

async fn run_edit_pages(state: &AppState, multipart: Multipart) -> Result<Response, AppError> {
    let form = upload::read_form(multipart).await?;
    let part = single_pdf(&form)?;
    let page_list = |field: &str| {
        parse_pages(form.text(field)).map_err(|e| AppError::from_core(EDIT_ERROR, e))
    };
    let edits = PageEdits {
        delete: page_list("delete_pages")?,
        order: page_list("new_order")?,
        rotate_right: page_list("rotate_right")?,
        rotate_left: page_list("rotate_left")?,
    };

    let scratch = ScratchDir::create(&state.upload_dir).await?;
    let file = store_single(&scratch, part).await?;

    let command = PdfCommand::EditPages {
        file: file.bytes,
        edits,
        policy: state.page_policy,
    };
    let output = state.execute(EDIT_ERROR, command).await?;
    scratch.write_output("edit_pages", &output.data).await?;

    Ok(download("edited_output.pdf", output.data))
}

/// Step one of the text editor: extract the text, keep a copy under a new
/// document id and show the editor.
pub async fn text_editor(
    State(state): State<AppState>,
    session: Session,
    multipart: Multipart,
) -> Response {
    let result = run_text_editor(&state, multipart).await;
    finish(&session, "/text_editor", result).await
}

async fn run_text_editor(state: &AppState, multipart: Multipart) -> Result<Response, AppError> {
    let form = upload::read_form(multipart).await?;
    let part = single_pdf(&form)?;

    let scratch = ScratchDir::create(&state.upload_dir).await?;
    let file = store_single(&scratch, part).await?;

    let bytes = file.bytes;
    let pages = state
        .run_blocking(EXTRACT_ERROR, move || pdfdesk_core::extract_pages_text(&bytes))
        .await?;
    let text = pdfdesk_core::join_pages(&pages);

    let pdf_id = Uuid::new_v4();
    let artifact = state.upload_dir.join(format!("{}.txt", pdf_id));
    tokio::fs::write(&artifact, &text)
        .await
        .map_err(|e| AppError::backend(EXTRACT_ERROR, e))?;
    tracing::info!(%pdf_id, pages = pages.len(), "Extracted text for editing");

    Ok(Html(views::text_editor(&[], &pdf_id.to_string(), &text)).into_response())
}

/// Re-open the editor for a document whose text is still on disk.
pub async fn text_editor_resume(
    State(state): State<AppState>,
    session: Session,
    Path(pdf_id): Path<String>,
) -> Response {
    let result = run_text_editor_resume(&state, &session, &pdf_id).await;
    finish(&session, "/text_editor", result).await
}

async fn run_text_editor_resume(
    state: &AppState,
    session: &Session,
    pdf_id: &str,
) -> Result<Response, AppError> {
    let not_found = || AppError::NotFound("Document not found or expired.".into());
    let pdf_id = Uuid::parse_str(pdf_id).map_err(|_| not_found())?;

    let artifact = state.upload_dir.join(format!("{}.txt", pdf_id));
    let text = match tokio::fs::read_to_string(&artifact).await {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
        Err(e) => return Err(AppError::backend(EXTRACT_ERROR, e)),
    };

    let flashes = flash::take(session).await;
    Ok(Html(views::text_editor(&flashes, &pdf_id.to_string(), &text)).into_response())
}

#[derive(Debug, Deserialize)]
pub struct ApplyForm {
    #[serde(default)]
    pub pdf_id: String,
    #[serde(default)]
    pub updated_text: String,
}

/// Step two of the text editor: typeset the edited text into a new PDF.
/// The original document is not consulted.
pub async fn text_editor_apply(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<ApplyForm>,
) -> Response {
    let result = run_text_editor_apply(&state, form).await;
    finish(&session, "/text_editor", result).await
}

async fn run_text_editor_apply(state: &AppState, form: ApplyForm) -> Result<Response, AppError> {
    let pdf_id = form.pdf_id.trim();
    if pdf_id.is_empty() {
        return Err(AppError::validation("Missing document ID."));
    }
    let pdf_id = Uuid::parse_str(pdf_id)
        .map_err(|_| AppError::validation("Invalid document ID."))?;

    let command = PdfCommand::RenderText {
        text: form.updated_text,
        layout: TextLayout::default(),
    };
    let output = state.execute(REBUILD_ERROR, command).await?;

    Ok(download(&format!("text_edited_{}.pdf", pdf_id), output.data))
}

/// The one file of a single-file PDF form.
fn single_pdf(form: &UploadForm) -> Result<&FilePart, AppError> {
    let part = form
        .files("pdf_file")
        .into_iter()
        .next()
        .ok_or_else(|| AppError::validation("Please upload a PDF file."))?;
    if !upload::allowed(&part.file_name, ALLOWED_PDF) {
        return Err(AppError::validation("Only PDF files are allowed."));
    }
    Ok(part)
}

async fn store_single(scratch: &ScratchDir, part: &FilePart) -> Result<UploadedFile, AppError> {
    let files = scratch.store_allowed(&[part], ALLOWED_PDF).await?;
    log_stored(&files);
    files
        .into_iter()
        .next()
        .ok_or_else(|| AppError::validation("Only PDF files are allowed."))
}

fn log_stored(files: &[UploadedFile]) {
    for file in files {
        tracing::debug!(
            original = %file.original_name,
            safe_name = %file.safe_name,
            extension = %file.extension,
            stored = %file.path.display(),
            bytes = file.bytes.len(),
            "Stored upload"
        );
    }
}

fn download(file_name: &str, data: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        data,
    )
        .into_response()
}

/// Turn a handler outcome into the response: errors are flashed and the
/// browser is sent back to `form`.
async fn finish(session: &Session, form: &'static str, result: Result<Response, AppError>) -> Response {
    let err = match result {
        Ok(response) => return response,
        Err(err) => err,
    };

    match flash::push(session, err.to_string()).await {
        Ok(()) => {
            err.log();
            Redirect::to(form).into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Could not store flash message");
            err.into_response()
        }
    }
}
