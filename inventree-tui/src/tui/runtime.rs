//! Event loop
//!
//! Terminal input and finished background work both arrive on one unbounded
//! queue. The loop is the only consumer, so app state is only ever touched
//! from here; background futures just produce messages.

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::DefaultTerminal;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::app::App;
use super::command::Command;
use super::subscription::Subscription;

pub enum RuntimeEvent<Msg> {
    Key(KeyEvent),
    Resize,
    App(Msg),
}

/// Resolve a key press to a message: subscriptions first, then the app
pub fn route_key<A: App>(state: &A::State, key: KeyEvent) -> Option<A::Msg> {
    for subscription in A::subscriptions(state) {
        let Subscription::Keyboard { binding, msg } = subscription;
        if binding.matches(&key) {
            return Some(msg);
        }
    }
    A::on_key(state, key)
}

/// Start background work. Returns true when the app asked to quit.
pub fn execute<Msg: Send + 'static>(command: Command<Msg>, tx: &UnboundedSender<RuntimeEvent<Msg>>) -> bool {
    match command {
        Command::None => false,
        Command::Quit => true,
        Command::Batch(commands) => commands
            .into_iter()
            .fold(false, |quit, command| execute(command, tx) || quit),
        Command::Perform(future) => {
            let tx = tx.clone();
            tokio::spawn(async move {
                let msg = future.await;
                if tx.send(RuntimeEvent::App(msg)).is_err() {
                    log::debug!("Dropping message, event loop has exited");
                }
            });
            false
        }
    }
}

fn spawn_input_reader<Msg: Send + 'static>(tx: UnboundedSender<RuntimeEvent<Msg>>) {
    std::thread::spawn(move || {
        loop {
            let forwarded = match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => tx.send(RuntimeEvent::Key(key)),
                Ok(Event::Resize(_, _)) => tx.send(RuntimeEvent::Resize),
                Ok(_) => Ok(()),
                Err(e) => {
                    log::error!("Failed to read terminal event: {}", e);
                    break;
                }
            };
            if forwarded.is_err() {
                break;
            }
        }
    });
}

fn handle_event<A: App>(state: &mut A::State, event: RuntimeEvent<A::Msg>) -> Command<A::Msg> {
    match event {
        RuntimeEvent::Key(key) => match route_key::<A>(state, key) {
            Some(msg) => A::update(state, msg),
            None => Command::None,
        },
        RuntimeEvent::Resize => Command::None,
        RuntimeEvent::App(msg) => A::update(state, msg),
    }
}

async fn event_loop<A: App>(
    terminal: &mut DefaultTerminal,
    params: A::InitParams,
    tx: UnboundedSender<RuntimeEvent<A::Msg>>,
    mut rx: UnboundedReceiver<RuntimeEvent<A::Msg>>,
) -> Result<()> {
    let (mut state, init) = A::init(params);
    if execute(init, &tx) {
        return Ok(());
    }

    loop {
        terminal
            .draw(|frame| A::view(&mut state, frame))
            .context("Failed to draw frame")?;

        let Some(event) = rx.recv().await else { break };
        if execute(handle_event::<A>(&mut state, event), &tx) {
            break;
        }
        // Drain whatever queued up meanwhile before drawing again
        while let Ok(event) = rx.try_recv() {
            if execute(handle_event::<A>(&mut state, event), &tx) {
                return Ok(());
            }
        }
    }
    Ok(())
}

/// Take over the terminal and run `A` until it quits
pub async fn run<A: App>(params: A::InitParams) -> Result<()> {
    let (tx, rx) = mpsc::unbounded_channel();
    spawn_input_reader(tx.clone());

    let mut terminal = ratatui::try_init().context("Failed to initialise terminal")?;
    log::info!("Starting {}", A::title());
    let result = event_loop::<A>(&mut terminal, params, tx, rx).await;
    ratatui::restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::subscription::KeyBinding;
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::Frame;

    struct Counter;

    #[derive(Debug, PartialEq)]
    enum Msg {
        Increment,
        Quit,
        Loaded(u32),
    }

    impl App for Counter {
        type State = u32;
        type Msg = Msg;
        type InitParams = ();

        fn init(_: ()) -> (u32, Command<Msg>) {
            (0, Command::None)
        }

        fn update(state: &mut u32, msg: Msg) -> Command<Msg> {
            match msg {
                Msg::Increment => *state += 1,
                Msg::Loaded(n) => *state = n,
                Msg::Quit => return Command::Quit,
            }
            Command::None
        }

        fn view(_: &mut u32, _: &mut Frame) {}

        fn subscriptions(_: &u32) -> Vec<Subscription<Msg>> {
            vec![Subscription::keyboard(KeyBinding::ctrl('q'), Msg::Quit)]
        }

        fn on_key(_: &u32, key: KeyEvent) -> Option<Msg> {
            (key.code == KeyCode::Char('+')).then_some(Msg::Increment)
        }

        fn title() -> &'static str {
            "Counter"
        }
    }

    #[test]
    fn test_subscriptions_win_over_app_keys() {
        let quit = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL);
        let plus = KeyEvent::new(KeyCode::Char('+'), KeyModifiers::NONE);
        let other = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);

        assert_eq!(route_key::<Counter>(&0, quit), Some(Msg::Quit));
        assert_eq!(route_key::<Counter>(&0, plus), Some(Msg::Increment));
        assert_eq!(route_key::<Counter>(&0, other), None);
    }

    #[tokio::test]
    async fn test_performed_work_comes_back_as_message() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let quit = execute(Command::perform(async { 7 }, Msg::Loaded), &tx);
        assert!(!quit);

        let mut state = 0;
        let event = rx.recv().await.unwrap();
        let _ = handle_event::<Counter>(&mut state, event);
        assert_eq!(state, 7);
    }

    #[test]
    fn test_quit_inside_batch_is_reported() {
        let (tx, _rx) = mpsc::unbounded_channel::<RuntimeEvent<Msg>>();
        assert!(execute(Command::Batch(vec![Command::None, Command::Quit]), &tx));
    }
}
