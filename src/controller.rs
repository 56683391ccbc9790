use std::time::Duration;
use tracing::trace;

use ratatui::crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};

use crate::domain::{AirscopeError, ExplorerConfig, Message};
use crate::ui::MapGeometry;

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &ExplorerConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, map: &MapGeometry) -> Result<Option<Message>, AirscopeError> {
        if event::poll(Duration::from_millis(self.event_poll_time))? {
            return Ok(self.map_event(event::read()?, map));
        }
        Ok(None)
    }

    pub fn map_event(&self, event: Event, map: &MapGeometry) -> Option<Message> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse, map),
            Event::Resize(width, height) => Some(Message::Resize(width as usize, height as usize)),
            _ => None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Option<Message> {
        let message = match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Char('?') => Some(Message::Help),
            KeyCode::Esc => Some(Message::Exit),
            KeyCode::Char('+') | KeyCode::Char('=') => Some(Message::IncreaseTopN),
            KeyCode::Char('-') => Some(Message::DecreaseTopN),
            KeyCode::Char(']') | KeyCode::Right => Some(Message::MarkCursorNext),
            KeyCode::Char('[') | KeyCode::Left => Some(Message::MarkCursorPrev),
            KeyCode::Enter => Some(Message::SelectCursorMark),
            KeyCode::Char('f') => Some(Message::NextMapFilter),
            KeyCode::Char('a') => Some(Message::ClearMapFilter),
            KeyCode::Char('y') => Some(Message::CopyDetail),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }

    fn handle_mouse(&self, mouse: MouseEvent, map: &MapGeometry) -> Option<Message> {
        if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return None;
        }
        let message = map
            .nearest_mark(mouse.column, mouse.row)
            .map(Message::SelectMark);
        trace!(
            "Click at {}:{} => {message:?}",
            mouse.column, mouse.row
        );
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;
    use ratatui::layout::Rect;

    fn controller() -> Controller {
        Controller::new(&ExplorerConfig::default())
    }

    fn click(column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn keys_map_to_messages() {
        let map = MapGeometry::default();
        let key = |c| Event::Key(KeyEvent::new(c, KeyModifiers::NONE));
        let c = controller();
        assert_eq!(c.map_event(key(KeyCode::Char('q')), &map), Some(Message::Quit));
        assert_eq!(
            c.map_event(key(KeyCode::Char('+')), &map),
            Some(Message::IncreaseTopN)
        );
        assert_eq!(
            c.map_event(key(KeyCode::Enter), &map),
            Some(Message::SelectCursorMark)
        );
        assert_eq!(c.map_event(key(KeyCode::Char('z')), &map), None);
    }

    #[test]
    fn click_on_mark_selects_it() {
        let map = MapGeometry::new(
            Rect::new(0, 0, 21, 11),
            [0.0, 20.0],
            [0.0, 10.0],
            &[(0.0, 10.0), (20.0, 0.0)],
        );
        let c = controller();
        assert_eq!(c.map_event(click(20, 10), &map), Some(Message::SelectMark(1)));
        assert_eq!(c.map_event(click(0, 0), &map), Some(Message::SelectMark(0)));
        assert_eq!(c.map_event(click(10, 5), &map), None);
    }

    #[test]
    fn resize_is_forwarded() {
        let c = controller();
        assert_eq!(
            c.map_event(Event::Resize(120, 40), &MapGeometry::default()),
            Some(Message::Resize(120, 40))
        );
    }
}
