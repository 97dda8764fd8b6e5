//! View models for every page of the magazine front end.
//!
//! Each view owns its local state, performs one fetch-render-mutate cycle against
//! the external API and isolates its own failures. Views never share state with
//! each other.

mod comments;
mod contributors;
mod issues;
mod pages;
mod subscribe;
mod testimonials;

pub use comments::*;
pub use contributors::*;
pub use issues::*;
pub use pages::*;
pub use subscribe::*;
pub use testimonials::*;

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::errors::AppError;

/// Lifecycle of a view's most recent operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Success,
    Error(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }
}

/// Mount/unmount lifetime shared by a view and whoever may tear it down.
///
/// Requests run through [`ViewScope::run`] are dropped as soon as the scope, or
/// the scope it was derived from, is unmounted. The view then sees
/// `AppError::Cancelled` instead of a result.
#[derive(Debug, Clone)]
pub struct ViewScope {
    unmounted: Arc<watch::Sender<bool>>,
    parent: Option<Arc<watch::Sender<bool>>>,
}

impl Default for ViewScope {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewScope {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            unmounted: Arc::new(tx),
            parent: None,
        }
    }

    /// A fresh scope that is also unmounted when `self` is.
    pub fn child(&self) -> Self {
        Self {
            parent: Some(self.unmounted.clone()),
            ..Self::new()
        }
    }

    pub fn unmount(&self) {
        self.unmounted.send_replace(true);
    }

    pub fn is_mounted(&self) -> bool {
        !*self.unmounted.borrow() && self.parent.as_ref().map_or(true, |p| !*p.borrow())
    }

    /// Drive `request` to completion unless the scope unmounts first.
    pub async fn run<T, F>(&self, request: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        if !self.is_mounted() {
            return Err(cancelled());
        }

        let own = wait_for_unmount(self.unmounted.subscribe());
        let parent = async {
            match &self.parent {
                Some(parent) => wait_for_unmount(parent.subscribe()).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            result = request => result,
            _ = own => Err(cancelled()),
            _ = parent => Err(cancelled()),
        }
    }
}

async fn wait_for_unmount(mut rx: watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

fn cancelled() -> AppError {
    AppError::Cancelled("View unmounted before the request finished".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_run_passes_result_through() {
        let scope = ViewScope::new();
        let result = scope.run(async { Ok::<_, AppError>(7) }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn test_unmounted_scope_never_polls_request() {
        let scope = ViewScope::new();
        scope.unmount();
        assert!(!scope.is_mounted());

        let polled = AtomicBool::new(false);
        let result = scope
            .run(async {
                polled.store(true, Ordering::SeqCst);
                Ok::<_, AppError>(())
            })
            .await;
        assert!(matches!(result, Err(AppError::Cancelled(_))));
        assert!(!polled.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_unmount_aborts_in_flight_request() {
        let scope = ViewScope::new();
        let handle = scope.clone();

        let slow = async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, AppError>(())
        };
        let (result, ()) = tokio::join!(scope.run(slow), async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            handle.unmount();
        });

        assert!(matches!(result, Err(AppError::Cancelled(_))));
    }

    #[tokio::test]
    async fn test_parent_unmount_cancels_child() {
        let root = ViewScope::new();
        let child = root.child();
        let sibling = root.child();
        assert!(child.is_mounted());

        let slow = async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, AppError>(())
        };
        let (result, ()) = tokio::join!(child.run(slow), async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            root.unmount();
        });

        assert!(matches!(result, Err(AppError::Cancelled(_))));
        assert!(!sibling.is_mounted());
    }

    #[tokio::test]
    async fn test_child_unmount_leaves_parent_mounted() {
        let root = ViewScope::new();
        let child = root.child();
        child.unmount();

        assert!(root.is_mounted());
        assert_eq!(root.run(async { Ok::<_, AppError>(1) }).await, Ok(1));
        assert!(child.run(async { Ok::<_, AppError>(1) }).await.is_err());
    }

    #[test]
    fn test_load_state_serializes_with_status_tag() {
        let idle = serde_json::to_value(LoadState::Idle).unwrap();
        assert_eq!(idle, serde_json::json!({"status": "idle"}));

        let failed = serde_json::to_value(LoadState::Error("boom".to_string())).unwrap();
        assert_eq!(
            failed,
            serde_json::json!({"status": "error", "message": "boom"})
        );
    }
}
