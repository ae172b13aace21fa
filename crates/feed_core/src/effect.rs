use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Deliver `Msg::DeltaExpired { token }` once `after` has elapsed.
    ClearDeltaAfter {
        token: crate::DeltaToken,
        after: Duration,
    },
}
