//! Viewer binary: a popup window fed through the drop directory.
//!
//! The window polls the `preview` directory (relative to the working
//! directory the editor spawned us with) on a timer tick, shows whatever
//! lands there and resizes itself to the image. Closing the window is
//! the viewer's only normal exit; the editor may also kill the process.

use std::path::Path;

use iced::widget::{container, image, text};
use iced::{window, Color, Element, Length, Size, Subscription, Task, Theme};
use tracing_subscriber::EnvFilter;

use phototag::config::DROP_DIR_NAME;
use phototag::viewer::{self, POLL_INTERVAL, POLL_INTERVAL_FAST};

/// Popup window state
struct Viewer {
    /// Pixels of the most recently consumed drop, if any
    handle: Option<image::Handle>,
    /// One tightened poll after a render picks up a queued follow-up
    fast_poll: bool,
}

#[derive(Debug, Clone)]
enum Message {
    /// Poll timer fired
    Tick,
}

impl Viewer {
    fn new() -> (Self, Task<Message>) {
        (
            Viewer {
                handle: None,
                fast_poll: false,
            },
            Task::none(),
        )
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => match viewer::take_next(Path::new(DROP_DIR_NAME)) {
                Some(loaded) => {
                    let size = Size::new(loaded.width as f32, loaded.height as f32);
                    self.handle = Some(image::Handle::from_rgba(
                        loaded.width,
                        loaded.height,
                        loaded.pixels,
                    ));
                    self.fast_poll = true;

                    // Match the window's logical axes to the image
                    window::get_latest().and_then(move |id| window::resize(id, size))
                }
                None => {
                    self.fast_poll = false;
                    Task::none()
                }
            },
        }
    }

    fn view(&self) -> Element<Message> {
        let content: Element<Message> = match &self.handle {
            Some(handle) => image(handle.clone()).into(),
            None => text("Waiting for an image...").size(16).into(),
        };

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .style(|_theme| container::Style {
                background: Some(Color::BLACK.into()),
                ..container::Style::default()
            })
            .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        let interval = if self.fast_poll {
            POLL_INTERVAL_FAST
        } else {
            POLL_INTERVAL
        };
        iced::time::every(interval).map(|_| Message::Tick)
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("starting preview window");

    iced::application("Image Preview", Viewer::update, Viewer::view)
        .subscription(Viewer::subscription)
        .theme(Viewer::theme)
        .window_size(Size::new(480.0, 360.0))
        .centered()
        .run_with(Viewer::new)
}
