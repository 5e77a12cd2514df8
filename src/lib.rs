// jemalloc as the global allocator outside MSVC targets
#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

pub mod shared;
pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod interfaces;
