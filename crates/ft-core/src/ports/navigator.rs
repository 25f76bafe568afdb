use crate::navigation::Destination;

/// The router the navigation guard drives.
///
/// Implemented by the UI shell; `navigate` replaces the current route.
pub trait NavigatorPort: Send + Sync {
    fn navigate(&self, destination: Destination);
}
