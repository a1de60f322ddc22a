//! Page-range parsing
//!
//! Turns user text like `"1-3, 5"` into the list of page numbers it names.
//! The list keeps the order and duplicates of the input; whether a number
//! actually exists in a document is decided later by [`OutOfRangePolicy`].

use crate::error::PdfDeskError;

/// Upper bound on the pages a single `A-B` token may expand to.
pub const MAX_RANGE_SPAN: u32 = 100_000;

/// Upper bound on the length of a whole page list.
pub const MAX_PAGE_ENTRIES: usize = 100_000;

/// Parse a page specification like `"1-3,5"` into `[1, 2, 3, 5]`.
///
/// Ranges are inclusive and expand in ascending order. Tokens are emitted in
/// the order they appear, so `"3,1"` yields `[3, 1]` and `"1,1"` yields
/// `[1, 1]`. Blank input and blank tokens produce nothing.
pub fn parse_pages(input: &str) -> Result<Vec<u32>, PdfDeskError> {
    let mut pages = Vec::new();

    for part in input.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }

        if let Some((start, end)) = part.split_once('-') {
            let start = parse_page_number(start, part)?;
            let end = parse_page_number(end, part)?;

            if start > end {
                return Err(PdfDeskError::InvalidRange(format!(
                    "Start {} > end {} in '{}'",
                    start, end, part
                )));
            }

            if end - start >= MAX_RANGE_SPAN {
                return Err(PdfDeskError::InvalidRange(format!(
                    "Range '{}' spans more than {} pages",
                    part, MAX_RANGE_SPAN
                )));
            }

            reserve_entries(&pages, (end - start) as usize + 1)?;
            pages.extend(start..=end);
        } else {
            let page = parse_page_number(part, part)?;
            reserve_entries(&pages, 1)?;
            pages.push(page);
        }
    }

    Ok(pages)
}

fn reserve_entries(pages: &[u32], extra: usize) -> Result<(), PdfDeskError> {
    if pages.len() + extra > MAX_PAGE_ENTRIES {
        return Err(PdfDeskError::InvalidRange(format!(
            "Page list names more than {} pages",
            MAX_PAGE_ENTRIES
        )));
    }
    Ok(())
}

fn parse_page_number(raw: &str, token: &str) -> Result<u32, PdfDeskError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(PdfDeskError::InvalidRange(format!(
            "Missing page number in '{}'",
            token
        )));
    }
    raw.parse()
        .map_err(|_| PdfDeskError::InvalidRange(format!("Invalid page '{}'", token)))
}

/// What to do with page numbers that fall outside `1..=total`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutOfRangePolicy {
    /// Drop them silently.
    #[default]
    Ignore,
    /// Fail the whole operation.
    Reject,
}

impl OutOfRangePolicy {
    /// Filter `pages` against a document with `total` pages.
    pub fn apply(self, pages: &[u32], total: u32) -> Result<Vec<u32>, PdfDeskError> {
        match self {
            OutOfRangePolicy::Ignore => Ok(pages
                .iter()
                .copied()
                .filter(|page| (1..=total).contains(page))
                .collect()),
            OutOfRangePolicy::Reject => {
                if let Some(bad) = pages.iter().find(|page| !(1..=total).contains(*page)) {
                    return Err(PdfDeskError::InvalidRange(format!(
                        "Page {} does not exist (document has {} pages)",
                        bad, total
                    )));
                }
                Ok(pages.to_vec())
            }
        }
    }
}
