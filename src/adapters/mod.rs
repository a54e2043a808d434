//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements     | Connects to                     |
//! |----------------|----------------|---------------------------------|
//! | `board`        | OutputWriter   | 826 DAC outputs (or simulation) |
//! | `config_file`  | ConfigPort     | JSON file on disk               |
//! | `log_sink`     | EventSink      | `log` facade                    |
//! | `redis_store`  | KeyValueStore  | Redis server                    |

pub mod board;
pub mod config_file;
pub mod log_sink;
pub mod redis_store;
