//! Frameshell — device shell core, demo mode.
//!
//! Drives the shell headlessly through a scripted session: boots the
//! homescreen, opens frames, exercises visibility arbitration, the
//! overview carousel, split screen, and android-back, then shuts down.

use frameshell::app::{shell_queue, Shell};
use frameshell::managers::frame_manager::FrameManagerTrait;
use frameshell::services::event_bus::EventBus;
use frameshell::services::renderer::HeadlessRenderer;
use frameshell::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use frameshell::types::command::{Command, Notice, VisibilityUpdate};
use frameshell::types::frame::{FrameConfig, FrameId};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt().init();

    let mut engine = SettingsEngine::new(None);
    let settings = engine.load().unwrap_or_default();

    let bus = EventBus::new();
    bus.subscribe(|notice| match notice {
        Notice::FrameOpened { id, url } => println!("  opened    {} ({})", id, url),
        Notice::FrameActivated { id } => println!("  activated {}", id),
        Notice::FrameClosed { id } => println!("  closed    {}", id),
        Notice::FrameListUpdated { frames } => {
            let urls: Vec<&str> = frames.iter().map(|f| f.url.as_str()).collect();
            println!("  taskbar   {:?}", urls);
        }
        Notice::DesktopModeChanged { enabled } => println!("  desktop   {}", enabled),
    });

    let (tx, rx) = shell_queue();
    let renderer = HeadlessRenderer::new(tx.clone());
    let mut shell = Shell::new(settings, Box::new(renderer), bus, tx, rx);
    shell.set_viewport(1280.0, 800.0);

    println!("frameshell demo — booting homescreen");
    shell.startup();

    let handle = shell.handle();
    let open = |url: &str| Command::OpenFrame {
        url: url.to_string(),
        config: FrameConfig::default(),
    };

    println!("\nopening application frames");
    handle.post(open("https://mail.example.org"));
    handle.post(open("https://music.example.org"));

    println!("\nvisibility settles on music, then a scroll lands on mail");
    handle.post(Command::VisibilityBatch(vec![VisibilityUpdate {
        id: FrameId(2),
        ratio: 1.0,
    }]));
    handle.post(Command::VisibilityBatch(vec![
        VisibilityUpdate {
            id: FrameId(1),
            ratio: 0.9,
        },
        VisibilityUpdate {
            id: FrameId(2),
            ratio: 0.1,
        },
    ]));

    println!("\noverview carousel round-trip");
    handle.post(Command::OpenCarousel);
    handle.post(Command::CarouselStep { backwards: false });
    handle.post(Command::CarouselCommit);

    println!("\nsplit screen on the active frame, then android-back twice");
    handle.post(Command::SplitScreen { id: None });
    handle.post(Command::AndroidBack);
    handle.post(Command::AndroidBack);

    handle.post(Command::Shutdown);
    shell.run().await;

    println!(
        "\ndone — {} frame(s) remain, active = {:?}",
        shell.frames().frame_count(),
        shell.frames().active_frame()
    );
}
