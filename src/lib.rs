pub mod animation;
pub mod canvas;
pub mod cli;
pub mod config;
pub mod crawler;
pub mod error;
pub mod logging;
pub mod navigation;
pub mod node;
pub mod radial_layout;
pub mod render_tree;
pub mod tree;
pub mod watch;
pub mod weight;

pub use config::Config;
pub use error::{ConfigError, ScanError, WatchError};
pub use navigation::{NavCommand, Navigator};
pub use node::FsNode;
pub use render_tree::NodeView;
pub use tree::{FileTree, TreeEvent};
pub use weight::WeightTable;
