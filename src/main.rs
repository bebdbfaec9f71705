use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::egui;
use glam::Vec2;
use tracing::{info, warn};

use fsview::canvas::Camera;
use fsview::cli::Args;
use fsview::config::Config;
use fsview::logging::{self, LogTarget};
use fsview::navigation::{NavCommand, Navigator};
use fsview::watch::RootWatcher;

const BACKGROUND: egui::Color32 = egui::Color32::from_rgb(25, 25, 25);
const DIR_COLOR: egui::Color32 = egui::Color32::from_rgb(0, 121, 241);
const FILE_COLOR: egui::Color32 = egui::Color32::from_rgb(0, 228, 48);
const SELECTION_COLOR: egui::Color32 = egui::Color32::from_rgb(230, 41, 55);
const LABEL_OFFSET: Vec2 = Vec2::new(13.0, -13.0);
const LABEL_SIZE: f32 = 12.0;
const RING_PADDING: f32 = 5.0;

/// Key to command, checked in this order every frame.
const KEY_BINDINGS: [(egui::Key, NavCommand); 11] = [
    (egui::Key::U, NavCommand::Rescan),
    (egui::Key::X, NavCommand::Reroot),
    (egui::Key::Z, NavCommand::Ascend),
    (egui::Key::C, NavCommand::MoveToChild),
    (egui::Key::ArrowDown, NavCommand::MoveToChild),
    (egui::Key::P, NavCommand::MoveToParent),
    (egui::Key::ArrowUp, NavCommand::MoveToParent),
    (egui::Key::L, NavCommand::MovePreviousSibling),
    (egui::Key::ArrowLeft, NavCommand::MovePreviousSibling),
    (egui::Key::R, NavCommand::MoveNextSibling),
    (egui::Key::ArrowRight, NavCommand::MoveNextSibling),
];

fn main() -> Result<()> {
    let args = Args::parse();
    let log_target = match args.log_file.as_deref() {
        Some(path) => LogTarget::File(path.to_path_buf()),
        None => LogTarget::Stderr,
    };
    logging::init(&log_target).context("failed to open log file")?;

    let mut config = Config::resolve(args.config.as_deref()).context("invalid configuration")?;
    args.apply_overrides(&mut config);
    let root = args.root_path().context("failed to resolve root path")?;

    let mut navigator = Navigator::with_config(&root, &config).context("invalid configuration")?;
    navigator.on_target_lost(|path| info!(path = %path.display(), "selection removed from disk"));

    let watcher = if args.watch {
        Some(RootWatcher::new(&root).context("failed to watch root")?)
    } else {
        None
    };
    info!(root = %root.display(), watch = args.watch, "starting");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.window.width, config.window.height])
            .with_title("fsview"),
        ..Default::default()
    };

    eframe::run_native(
        "fsview",
        options,
        Box::new(move |_cc| Box::new(FsViewApp::new(navigator, watcher))),
    )
    .map_err(|err| anyhow!("window failed: {err}"))
}

struct FsViewApp {
    navigator: Navigator,
    watcher: Option<RootWatcher>,
}

impl FsViewApp {
    fn new(navigator: Navigator, watcher: Option<RootWatcher>) -> Self {
        Self { navigator, watcher }
    }

    fn handle_input(&mut self, ctx: &egui::Context) {
        let pressed: Vec<NavCommand> = ctx.input(|i| {
            KEY_BINDINGS
                .iter()
                .filter(|(key, _)| i.key_pressed(*key))
                .map(|&(_, command)| command)
                .collect()
        });
        for command in pressed {
            self.navigator.queue(command);
        }
    }

    fn poll_watcher(&mut self) {
        let Some(watcher) = self.watcher.as_mut() else {
            return;
        };
        if let Err(err) = watcher.rearm(self.navigator.root_path()) {
            warn!(%err, "watch disabled");
            self.watcher = None;
            return;
        }
        if watcher.poll_changed() {
            self.navigator.queue(NavCommand::Rescan);
        }
    }

    fn paint(&self, painter: &egui::Painter, rect: egui::Rect) {
        painter.rect_filled(rect, 0.0, BACKGROUND);

        let mut camera = Camera::new(rect.width(), rect.height());
        camera.set_origin(rect.min.x, rect.min.y);

        for view in self.navigator.views() {
            let center = to_pos(camera.world_to_screen(view.position));
            let radius = view.radius * camera.zoom;
            let color = if view.is_dir { DIR_COLOR } else { FILE_COLOR };
            painter.circle_filled(center, radius, color);

            if view.show_label {
                let anchor = to_pos(camera.world_to_screen(view.position + LABEL_OFFSET));
                painter.text(
                    anchor,
                    egui::Align2::LEFT_TOP,
                    view.name,
                    egui::FontId::proportional(LABEL_SIZE * camera.zoom),
                    egui::Color32::WHITE,
                );
            }
            if view.selected {
                painter.circle_stroke(
                    center,
                    (RING_PADDING + view.radius) * camera.zoom,
                    egui::Stroke::new(1.0, SELECTION_COLOR),
                );
            }
        }
    }
}

fn to_pos(v: Vec2) -> egui::Pos2 {
    egui::pos2(v.x, v.y)
}

impl eframe::App for FsViewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_input(ctx);
        self.poll_watcher();

        let dt = ctx.input(|i| i.stable_dt);
        self.navigator.tick(dt as f64);

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                self.paint(ui.painter(), rect);
            });

        // The tree is always easing toward its targets.
        ctx.request_repaint();
    }
}
