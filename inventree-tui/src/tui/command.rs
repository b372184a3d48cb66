//! Side effects requested by `App::update`

use futures::future::BoxFuture;
use futures::FutureExt;
use std::future::Future;

pub enum Command<Msg> {
    None,
    Batch(Vec<Command<Msg>>),
    /// Run a future off the event loop; its output comes back as a message
    Perform(BoxFuture<'static, Msg>),
    Quit,
}

impl<Msg: Send + 'static> Command<Msg> {
    pub fn perform<T, F>(future: F, to_msg: impl FnOnce(T) -> Msg + Send + 'static) -> Self
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        Command::Perform(future.map(to_msg).boxed())
    }

    pub fn batch(commands: impl IntoIterator<Item = Command<Msg>>) -> Self {
        let commands: Vec<_> = commands
            .into_iter()
            .filter(|c| !matches!(c, Command::None))
            .collect();
        match commands.len() {
            0 => Command::None,
            _ => Command::Batch(commands),
        }
    }

    /// Lift a child's command into the parent's message type
    pub fn map<N: Send + 'static>(self, f: fn(Msg) -> N) -> Command<N> {
        match self {
            Command::None => Command::None,
            Command::Quit => Command::Quit,
            Command::Batch(commands) => Command::Batch(commands.into_iter().map(|c| c.map(f)).collect()),
            Command::Perform(future) => Command::Perform(future.map(f).boxed()),
        }
    }

    #[cfg(test)]
    pub fn is_none(&self) -> bool {
        matches!(self, Command::None)
    }
}

impl<Msg> std::fmt::Debug for Command<Msg> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::None => write!(f, "Command::None"),
            Command::Batch(commands) => write!(f, "Command::Batch({:?})", commands),
            Command::Perform(_) => write!(f, "Command::Perform(..)"),
            Command::Quit => write!(f, "Command::Quit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    enum Child {
        Loaded(u32),
    }

    #[derive(Debug, PartialEq)]
    enum Parent {
        Child(Child),
    }

    #[tokio::test]
    async fn test_map_wraps_performed_message() {
        let command = Command::perform(async { 4 }, Child::Loaded).map(Parent::Child);
        let Command::Perform(future) = command else {
            panic!("expected perform");
        };
        assert_eq!(future.await, Parent::Child(Child::Loaded(4)));
    }

    #[test]
    fn test_batch_drops_none() {
        let command: Command<Child> = Command::batch([Command::None, Command::None]);
        assert!(command.is_none());
    }
}

/// Run every performed future of `command` in order and return the messages
#[cfg(test)]
pub async fn collect_messages<Msg: Send + 'static>(command: Command<Msg>) -> Vec<Msg> {
    let mut pending = vec![command];
    let mut messages = Vec::new();
    while let Some(command) = pending.pop() {
        match command {
            Command::Batch(commands) => pending.extend(commands.into_iter().rev()),
            Command::Perform(future) => messages.push(future.await),
            Command::None | Command::Quit => {}
        }
    }
    messages
}
