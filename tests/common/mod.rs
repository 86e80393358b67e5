//! Common test utilities for integration tests.

#![allow(dead_code)]

pub mod harness;

use slint_workflow_editor::{EdgeId, GraphEvent, NodeId, Rejection};
use std::cell::RefCell;
use std::rc::Rc;

/// Records every graph event delivered to a controller subscriber.
#[derive(Default, Clone)]
pub struct EventTracker {
    pub events: Rc<RefCell<Vec<GraphEvent>>>,
}

impl EventTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all recorded events.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    pub fn all(&self) -> Vec<GraphEvent> {
        self.events.borrow().clone()
    }

    pub fn edges_created(&self) -> Vec<EdgeId> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                GraphEvent::EdgeCreated(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn edges_removed(&self) -> Vec<EdgeId> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                GraphEvent::EdgeRemoved(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn nodes_removed(&self) -> Vec<NodeId> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                GraphEvent::NodeRemoved(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn rejections(&self) -> Vec<Rejection> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                GraphEvent::EdgeRejected(reason) => Some(reason.clone()),
                _ => None,
            })
            .collect()
    }
}
