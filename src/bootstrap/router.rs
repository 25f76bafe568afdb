//! Headless router
//!
//! Stands in for the UI shell's router when no screens are attached: every
//! redirect is queued, logged, and reported back to the route tracker as an
//! immediate arrival.

use std::sync::Arc;

use ft_app::RouteTracker;
use ft_core::ports::NavigatorPort;
use ft_core::Destination;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

pub struct HeadlessNavigator {
    tx: mpsc::UnboundedSender<Destination>,
}

impl NavigatorPort for HeadlessNavigator {
    fn navigate(&self, destination: Destination) {
        if self.tx.send(destination).is_err() {
            debug!(%destination, "router stopped; navigation dropped");
        }
    }
}

/// Pending navigations, consumed by [`follow_routes`].
pub struct RouteQueue(mpsc::UnboundedReceiver<Destination>);

pub fn headless_router() -> (Arc<HeadlessNavigator>, RouteQueue) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(HeadlessNavigator { tx }), RouteQueue(rx))
}

/// Apply queued navigations until every navigator handle is gone.
pub fn follow_routes(queue: RouteQueue, routes: RouteTracker) -> JoinHandle<()> {
    let RouteQueue(mut rx) = queue;
    tokio::spawn(async move {
        while let Some(destination) = rx.recv().await {
            let segment = routes.report(destination.path());
            info!(%destination, ?segment, "navigated");
        }
        debug!("route follower stopped");
    })
}
