//! A deterministic stand-in for external state, used by `watchkv poll`.

use watchkv_poller::{ObservableSource, PollResult};

/// Simulated world advancing one step per sample.
///
/// - `clock` changes every step
/// - `phase` changes every third step
/// - `mode` never changes
/// - `boost` is present only on every fourth step
#[derive(Debug, Default)]
pub struct SimulatedWorld {
    step: i64,
}

impl ObservableSource for SimulatedWorld {
    type Value = i64;

    fn sample(&mut self) -> PollResult<Vec<(String, i64)>> {
        self.step += 1;
        let mut state = vec![
            ("clock".to_string(), self.step),
            ("phase".to_string(), self.step / 3),
            ("mode".to_string(), 1),
        ];
        if self.step % 4 == 0 {
            state.push(("boost".to_string(), 1));
        }
        Ok(state)
    }
}
