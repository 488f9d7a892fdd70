/// One claimed unit of work together with whatever was fetched for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<R> {
    /// Key used for logging and persistence (defaults to the claimed index)
    pub name: String,
    /// Cursor value this page was claimed with
    pub index: u64,
    /// Fetch result, `None` when the source does not fetch anything
    pub response: Option<R>,
}

impl<R> Page<R> {
    pub fn new(index: u64, response: R) -> Self {
        Self::named(index.to_string(), index, Some(response))
    }

    pub fn empty(index: u64) -> Self {
        Self::named(index.to_string(), index, None)
    }

    pub fn named(name: impl Into<String>, index: u64, response: Option<R>) -> Self {
        Self {
            name: name.into(),
            index,
            response,
        }
    }
}
