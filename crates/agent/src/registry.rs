use std::sync::{Arc, Weak};

use dashmap::DashMap;
use tracing::debug;

use holon_core::AgentAddress;

use crate::kernel::{Kernel, KernelInner};

/// Process-wide directory of running kernels.
///
/// Created explicitly and handed to each kernel through
/// [`crate::KernelBuilder::registry`]. Kernels register when they start and
/// unregister when their agent dies. Entries hold weak references only.
#[derive(Default)]
pub struct KernelRegistry {
    kernels: DashMap<AgentAddress, Weak<KernelInner>>,
}

impl KernelRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn register(&self, kernel: &Arc<KernelInner>) {
        debug!(kernel = %kernel.address(), "Kernel registered");
        self.kernels.insert(kernel.address(), Arc::downgrade(kernel));
    }

    pub fn unregister(&self, address: AgentAddress) -> bool {
        let removed = self.kernels.remove(&address).is_some();
        if removed {
            debug!(kernel = %address, "Kernel unregistered");
        }
        removed
    }

    pub fn get(&self, address: AgentAddress) -> Option<Kernel> {
        self.kernels
            .get(&address)
            .and_then(|entry| entry.value().upgrade())
            .map(Kernel::from_inner)
    }

    /// Kernels still alive, dropped ones pruned on the way.
    pub fn list(&self) -> Vec<Kernel> {
        self.kernels.retain(|_, kernel| kernel.strong_count() > 0);
        self.kernels
            .iter()
            .filter_map(|entry| entry.value().upgrade())
            .map(Kernel::from_inner)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }
}

impl std::fmt::Debug for KernelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KernelRegistry")
            .field("kernels", &self.kernels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_kernel_registers_and_unregisters() {
        let registry = KernelRegistry::new();
        let kernel = Kernel::builder()
            .registry(registry.clone())
            .keep_alive(true)
            .start()
            .unwrap();

        assert_eq!(registry.len(), 1);
        let found = registry.get(kernel.address()).unwrap();
        assert_eq!(found.address(), kernel.address());
        assert_eq!(registry.list().len(), 1);

        kernel.kill();
        assert!(kernel.wait_until_termination(Some(Duration::from_secs(5))));
        assert!(registry.get(kernel.address()).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregister_unknown() {
        let registry = KernelRegistry::new();
        assert!(!registry.unregister(AgentAddress::generate()));
    }
}
