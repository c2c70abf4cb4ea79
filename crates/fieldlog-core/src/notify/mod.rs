mod bridge;
mod dispatch;
mod throttle;

pub use bridge::{
    ChannelSink, NotificationBridge, NotificationSink, NotifyGate, NotifyMessage, NullSink,
    NOTIFICATION_TAG,
};
pub use dispatch::{ActionDispatcher, TimerAction};
pub use throttle::{UpdateThrottle, UPDATE_COOLDOWN_MS};
