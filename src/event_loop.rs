use std::io;
use std::time::Duration;

use crossterm::event::Event;

use crate::drivers::InputDriver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Quit,
}

/// A centralized event loop that drives the UI thread.
///
/// It owns the input driver, polls it for events (keyboard, mouse, resize)
/// and hands each one to a handler closure. Between bursts of input the
/// handler is also called with `None`, which is where the desk refreshes
/// stale panes and redraws.
pub struct EventLoop<D> {
    driver: D,
    poll_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
        }
    }

    pub fn poll(&mut self) -> io::Result<Option<Event>> {
        if self.driver.poll(self.poll_interval)? {
            Ok(Some(self.driver.read()?))
        } else {
            Ok(None)
        }
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Runs the loop on the current thread until the handler returns
    /// [`ControlFlow::Quit`].
    ///
    /// The `handler` is called with:
    /// - `Some(event)` for every input event.
    /// - `None` once per iteration before polling, for ticking and drawing.
    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(&mut D, Option<Event>) -> io::Result<ControlFlow>,
    {
        loop {
            if let ControlFlow::Quit = handler(&mut self.driver, None)? {
                break;
            }

            if self.driver.poll(self.poll_interval)? {
                // Drain everything that is already queued so a burst of
                // mouse scroll events does not lag behind the redraws.
                loop {
                    let event = self.driver.read()?;
                    if let ControlFlow::Quit = handler(&mut self.driver, Some(event))? {
                        return Ok(());
                    }
                    if !self.driver.poll(Duration::from_millis(0))? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::ScriptedInput;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn handler_sees_idle_ticks_and_every_event() {
        let driver = ScriptedInput::new([key('a'), key('b'), key('q')]);
        let mut event_loop = EventLoop::new(driver, Duration::ZERO);
        let mut seen = Vec::new();
        let mut idle = 0;
        event_loop
            .run(|_, event| {
                match event {
                    None => idle += 1,
                    Some(Event::Key(k)) => {
                        if let KeyCode::Char(c) = k.code {
                            seen.push(c);
                            if c == 'q' {
                                return Ok(ControlFlow::Quit);
                            }
                        }
                    }
                    Some(_) => {}
                }
                Ok(ControlFlow::Continue)
            })
            .unwrap();
        assert_eq!(seen, vec!['a', 'b', 'q']);
        assert_eq!(idle, 1);
        assert_eq!(event_loop.driver().remaining(), 0);
    }

    #[test]
    fn quit_on_idle_tick_stops_before_reading() {
        let driver = ScriptedInput::new([key('a')]);
        let mut event_loop = EventLoop::new(driver, Duration::ZERO);
        event_loop.run(|_, _| Ok(ControlFlow::Quit)).unwrap();
        assert_eq!(event_loop.driver().remaining(), 1);
    }

    #[test]
    fn poll_returns_none_when_idle() {
        let mut event_loop = EventLoop::new(ScriptedInput::default(), Duration::ZERO);
        assert!(event_loop.poll().unwrap().is_none());
    }
}
