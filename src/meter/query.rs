//! Read-only access to the meter for the transport layer.

use crate::meter::data::{MeterConfig, SwrSnapshot};
use crate::meter::store::SnapshotReader;

/// Handle given to request handlers: the latest reading plus the static config.
#[derive(Debug, Clone)]
pub struct MeterQuery {
    reader: SnapshotReader,
    config: MeterConfig,
}

impl MeterQuery {
    pub fn new(reader: SnapshotReader, config: MeterConfig) -> Self {
        Self { reader, config }
    }

    /// Latest snapshot, or the default reading if no tick has completed yet.
    pub fn get_snapshot(&self) -> SwrSnapshot {
        self.reader.read()
    }

    pub fn get_config(&self) -> MeterConfig {
        self.config
    }

    /// Whether at least one sampling tick has completed.
    pub fn is_live(&self) -> bool {
        self.reader.has_published()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meter::store::snapshot_store;
    use chrono::Utc;

    #[test]
    fn test_query_before_and_after_first_tick() {
        let (mut writer, reader) = snapshot_store();
        let config = MeterConfig::default().with_calibration(2.0, 3.0);
        let query = MeterQuery::new(reader, config);

        assert!(!query.is_live());
        assert_eq!(query.get_snapshot().swr, 1.0);
        assert_eq!(query.get_config(), config);

        writer.publish(SwrSnapshot {
            forward_power: 100.0,
            reverse_power: 25.0,
            swr: 3.0,
            reflection_coefficient: 0.5,
            power_loss_percent: 25.0,
            timestamp: Utc::now(),
        });

        assert!(query.is_live());
        assert_eq!(query.get_snapshot().swr, 3.0);
        assert_eq!(query.get_snapshot().forward_power, 100.0);
    }
}
