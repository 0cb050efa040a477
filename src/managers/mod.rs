// SessionKeeper state managers
// Managers hold Coordinator-side bookkeeping: the registered-tab set, the
// notification click-target table, and the idle rotation machinery.

pub mod notification_binder;
pub mod rotation_manager;
pub mod tab_registry;
