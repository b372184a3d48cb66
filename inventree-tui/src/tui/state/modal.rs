/// Open/closed state of a modal carrying its own data
#[derive(Debug, Clone)]
pub enum ModalState<T> {
    Closed,
    Open(T),
}

impl<T> Default for ModalState<T> {
    fn default() -> Self {
        ModalState::Closed
    }
}

impl<T> ModalState<T> {
    pub fn open_with(&mut self, data: T) {
        *self = ModalState::Open(data);
    }

    pub fn close(&mut self) {
        *self = ModalState::Closed;
    }

    /// Close and hand back the data the modal held
    pub fn take(&mut self) -> Option<T> {
        match std::mem::take(self) {
            ModalState::Open(data) => Some(data),
            ModalState::Closed => None,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, ModalState::Open(_))
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ModalState::Open(data) => Some(data),
            ModalState::Closed => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        match self {
            ModalState::Open(data) => Some(data),
            ModalState::Closed => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_closes() {
        let mut modal = ModalState::Closed;
        modal.open_with(3);
        assert!(modal.is_open());
        assert_eq!(modal.take(), Some(3));
        assert!(!modal.is_open());
        assert_eq!(modal.take(), None);
    }
}
