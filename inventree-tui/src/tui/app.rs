use crossterm::event::KeyEvent;
use ratatui::Frame;

use super::command::Command;
use super::subscription::Subscription;

/// An Elm-style application driven by `tui::runtime`
pub trait App: 'static {
    type State: Send + 'static;
    type Msg: Send + 'static;
    type InitParams;

    fn init(params: Self::InitParams) -> (Self::State, Command<Self::Msg>);

    fn update(state: &mut Self::State, msg: Self::Msg) -> Command<Self::Msg>;

    fn view(state: &mut Self::State, frame: &mut Frame);

    /// Global shortcuts, checked before `on_key`
    fn subscriptions(_state: &Self::State) -> Vec<Subscription<Self::Msg>> {
        Vec::new()
    }

    /// Key presses not claimed by a subscription
    fn on_key(_state: &Self::State, _key: KeyEvent) -> Option<Self::Msg> {
        None
    }

    fn title() -> &'static str;
}
