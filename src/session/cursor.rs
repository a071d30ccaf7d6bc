//! Search cursor
//!
//! Client-held paging state for one in-progress search. Boundary checks
//! happen here, before any request is sent; the cursor only moves once the
//! server has answered.

use crate::error::{ClientError, ErrorCode, Result};
use crate::protocol::{Page, TicketSearchParameters};

/// Paging state of the current search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    parameters: TicketSearchParameters,
    page_index: u64,
    page_count: u64,
}

impl Cursor {
    /// Cursor positioned on the first page a search returned
    pub(crate) fn begin<T>(parameters: TicketSearchParameters, page: &Page<T>) -> Result<Self> {
        check_index(page, 0)?;
        Ok(Self {
            parameters,
            page_index: 0,
            page_count: page.page_count,
        })
    }

    pub fn parameters(&self) -> &TicketSearchParameters {
        &self.parameters
    }

    pub fn page_index(&self) -> u64 {
        self.page_index
    }

    pub fn page_count(&self) -> u64 {
        self.page_count
    }

    /// Index of the next page, or an error if this is the last one
    pub(crate) fn next_index(&self) -> Result<u64> {
        if self.page_index + 1 >= self.page_count {
            return Err(ClientError::operation(
                ErrorCode::PAGE_NONEXISTENT,
                "no further pages",
            ));
        }
        Ok(self.page_index + 1)
    }

    /// Index of the previous page, or an error on the first one
    pub(crate) fn previous_index(&self) -> Result<u64> {
        match self.page_index.checked_sub(1) {
            Some(index) => Ok(index),
            None => Err(ClientError::operation(
                ErrorCode::PAGE_NONEXISTENT,
                "no previous page",
            )),
        }
    }

    /// Move to a page the server returned for `expected`
    ///
    /// The server's page count wins: result sets may grow or shrink
    /// between requests.
    pub(crate) fn move_to<T>(&mut self, expected: u64, page: &Page<T>) -> Result<()> {
        check_index(page, expected)?;
        self.page_index = expected;
        self.page_count = page.page_count;
        Ok(())
    }
}

fn check_index<T>(page: &Page<T>, expected: u64) -> Result<()> {
    // An empty result set is reported as page 0 of 0
    if page.page_index != expected {
        return Err(ClientError::protocol(format!(
            "server returned page {} when page {} was requested",
            page.page_index, expected
        )));
    }
    Ok(())
}

/// Domain error for paging without a search
pub(crate) fn search_not_started() -> ClientError {
    ClientError::operation(ErrorCode::SEARCH_NOT_STARTED, "no search has been started")
}
