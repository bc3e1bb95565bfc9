//! Small window exercising the stock widgets.
//!
//! Run with `RUST_LOG=info` to see frames being presented.

use arbor::{AppHooks, Component, EngineConfig, Runtime, ViewTree};
use arbor_widgets::{center, column, Button, Checkbox, Label, MessageBox, Slider, TextEdit};
use arbor_winit::{run, LogPresenter, ShellConfig};
use std::error::Error;
use std::time::Duration;

struct Demo;

impl AppHooks for Demo {
    fn opened(&mut self, tree: &mut ViewTree) {
        log::info!("demo opened with {} views", tree.len());
    }

    fn close_requested(&mut self, _tree: &mut ViewTree) -> bool {
        log::info!("closing");
        true
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut tree = ViewTree::new();
    let toast = tree.insert(
        MessageBox::new("Saved.", ["OK"])
            .on_choice(|cx, _| cx.dismiss_overlay())
            .view(),
    );

    let root = center(column(
        8,
        [
            Label::new("arbor demo").view(),
            TextEdit::new("edit me").view(),
            Checkbox::new("Remember", true)
                .on_toggle(|_, checked| log::info!("remember: {}", checked))
                .view(),
            Slider::new(50.0, 0.0..=100.0)
                .step(5.0)
                .on_change(|_, value| log::info!("value: {}", value))
                .view(),
            Button::new("Save")
                .on_click(move |cx| cx.show_toast(toast, Duration::from_secs(3)))
                .view(),
            Button::new("Quit").on_click(|cx| cx.request_close()).view(),
        ],
    ));
    tree.set_root_view(root)?;

    let runtime = Runtime::new(tree, EngineConfig::default()).with_hooks(Demo);
    run(
        runtime,
        ShellConfig::default().with_title("arbor demo").with_width(480).with_height(320),
        LogPresenter::default(),
    )?;
    Ok(())
}
