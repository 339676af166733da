//! Dashboard client: turns pushed snapshots into widgets.

pub mod connector;
pub mod history;
pub mod render;
pub mod session;
pub mod sort;
pub mod surface;

pub use connector::{Connector, FrameStream, WsConnector};
pub use history::{HISTORY_CAPACITY, NetworkHistory};
pub use render::{classify, render_snapshot};
pub use session::{
    ClientSession, DashboardState, IDLE_TIMEOUT, RECONNECT_DELAY, ReconnectPolicy, SessionEvent,
    SessionState, UiEvent,
};
pub use sort::{ConnectionColumn, ProcessColumn, SortOrder, SortState};
pub use surface::{SlotMap, Surface, UtilizationClass, Widget, slots};
