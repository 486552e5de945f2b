//! One-shot initialization guard.
//!
//! The lifecycle value lives in the contract. A setup routine can only run while an
//! `InitWindow` is open, each component registers exactly once, and a component's declared
//! dependencies must have registered before it. The composed contract's `initialize` is the
//! explicit build graph.

use meta_relay_types::Record;

use crate::{
    errors::{InitFault, RelayError},
    host::Env,
};

pub const INITIALIZED_VERSION: u8 = 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lifecycle {
    #[default]
    Uninitialized,
    Initializing,
    Initialized,
}

/// Active `Initializing` window over a contract's lifecycle.
#[derive(Debug)]
pub struct InitWindow<'a> {
    lifecycle: &'a mut Lifecycle,
    completed: Vec<&'static str>,
}

impl<'a> InitWindow<'a> {
    pub fn open(lifecycle: &'a mut Lifecycle) -> Result<Self, RelayError> {
        match *lifecycle {
            Lifecycle::Uninitialized => {
                *lifecycle = Lifecycle::Initializing;
                Ok(Self {
                    lifecycle,
                    completed: Vec::new(),
                })
            }
            Lifecycle::Initializing => Err(InitFault::AlreadyInitializing.into()),
            Lifecycle::Initialized => Err(InitFault::AlreadyInitialized.into()),
        }
    }

    /// Register `component`'s setup; fails if it already ran or a dependency has not.
    pub fn enter(
        &mut self,
        component: &'static str,
        dependencies: &[&'static str],
    ) -> Result<(), RelayError> {
        if *self.lifecycle != Lifecycle::Initializing {
            return Err(InitFault::NotInitializing.into());
        }
        if self.has_run(component) {
            return Err(InitFault::AlreadySetUp(component).into());
        }
        if let Some(&dependency) = dependencies.iter().find(|dep| !self.has_run(dep)) {
            return Err(InitFault::MissingDependency {
                component,
                dependency,
            }
            .into());
        }
        self.completed.push(component);
        Ok(())
    }

    pub fn has_run(&self, component: &str) -> bool {
        self.completed.iter().any(|done| *done == component)
    }

    pub fn close(self, env: &mut Env) {
        *self.lifecycle = Lifecycle::Initialized;
        env.emit(Record::Initialized {
            version: INITIALIZED_VERSION,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;

    fn env() -> Env {
        Env::new(1, Address::repeat_byte(0xcc))
    }

    #[test]
    fn opens_once() {
        let mut lifecycle = Lifecycle::default();
        let window = InitWindow::open(&mut lifecycle).unwrap();
        window.close(&mut env());
        assert_eq!(lifecycle, Lifecycle::Initialized);
        assert_eq!(
            InitWindow::open(&mut lifecycle).unwrap_err(),
            RelayError::InitializationState(InitFault::AlreadyInitialized)
        );
    }

    #[test]
    fn refuses_to_reopen_while_initializing() {
        let mut lifecycle = Lifecycle::Initializing;
        assert_eq!(
            InitWindow::open(&mut lifecycle).unwrap_err(),
            RelayError::InitializationState(InitFault::AlreadyInitializing)
        );
    }

    #[test]
    fn component_runs_exactly_once() {
        let mut lifecycle = Lifecycle::default();
        let mut window = InitWindow::open(&mut lifecycle).unwrap();
        window.enter("A", &[]).unwrap();
        assert_eq!(
            window.enter("A", &[]).unwrap_err(),
            RelayError::InitializationState(InitFault::AlreadySetUp("A"))
        );
    }

    #[test]
    fn dependencies_run_first() {
        let mut lifecycle = Lifecycle::default();
        let mut window = InitWindow::open(&mut lifecycle).unwrap();
        assert_eq!(
            window.enter("B", &["A"]).unwrap_err(),
            RelayError::InitializationState(InitFault::MissingDependency {
                component: "B",
                dependency: "A"
            })
        );
        window.enter("A", &[]).unwrap();
        window.enter("B", &["A"]).unwrap();
        assert!(window.has_run("B"));
    }

    #[test]
    fn close_emits_initialized() {
        let mut lifecycle = Lifecycle::default();
        let mut env = env();
        InitWindow::open(&mut lifecycle).unwrap().close(&mut env);
        assert_eq!(env.records(), &[Record::Initialized { version: 1 }]);
    }
}
