/// Remote data as seen by a view
#[derive(Debug, Clone, PartialEq)]
pub enum Resource<T> {
    NotAsked,
    Loading,
    Success(T),
    Failure(String),
}

impl<T> Default for Resource<T> {
    fn default() -> Self {
        Resource::NotAsked
    }
}

impl<T> Resource<T> {
    pub fn success(&self) -> Option<&T> {
        match self {
            Resource::Success(value) => Some(value),
            _ => None,
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for Resource<T> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Resource::Success(value),
            Err(err) => Resource::Failure(err.to_string()),
        }
    }
}
