/// Interfaces Layer - External Entry Points
///
/// ## Modules
/// - `cli`: command-line configuration and process bootstrap
/// - `simulation`: in-process market maker and taker driving one market

pub mod cli;
pub mod simulation;
