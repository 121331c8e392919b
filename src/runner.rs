use std::io;
use std::time::Duration;

use ratatui::Terminal;
use ratatui::backend::Backend;

use crate::app::DeskApp;
use crate::drivers::InputDriver;
use crate::event_loop::{ControlFlow, EventLoop};
use crate::ui::UiFrame;

/// Drive `app` until it asks to quit: tick and redraw on every loop
/// iteration, and route each input event through the app.
pub fn run_desk<B, D>(
    terminal: &mut Terminal<B>,
    driver: D,
    app: &mut DeskApp,
    poll_interval: Duration,
) -> io::Result<()>
where
    B: Backend,
    D: InputDriver,
{
    let mut event_loop = EventLoop::new(driver, poll_interval);
    event_loop.driver().set_mouse_capture(true)?;

    event_loop.run(|_driver, event| {
        match event {
            Some(evt) => {
                app.handle_event(&evt);
            }
            None => {
                app.tick();
                terminal
                    .draw(|frame| app.draw(&mut UiFrame::new(frame)))
                    .map_err(|e| io::Error::other(e.to_string()))?;
            }
        }
        if app.should_quit() {
            tracing::info!("quit requested");
            return Ok(ControlFlow::Quit);
        }
        Ok(ControlFlow::Continue)
    })
}
