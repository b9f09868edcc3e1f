//! 运行时生命周期管理

pub mod lifetime {
    pub mod logging;
    pub mod shutdown;
    pub mod startup;
}
