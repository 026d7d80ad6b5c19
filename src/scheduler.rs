use crate::bus::Bus;
use crate::errors::SensorError;
use crate::measurements::BarometerReading;
use crate::mpl3115a2::SharedSensor;
use std::sync::Arc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{error, info};

/// Poll the sensor every `period` and log each reading as a JSON line.
///
/// Each reading holds the sensor lock for the full acquisition, on the
/// blocking thread pool. Per-sample failures are logged and sampling goes
/// on; a poisoned lock or a panicked acquisition ends the loop. Stops after
/// `max_samples` successful readings when given.
pub async fn run_sampler<B>(
    sensor: SharedSensor<B>,
    sensor_id: String,
    period: Duration,
    max_samples: Option<u64>,
) -> Result<Vec<BarometerReading>, Box<dyn std::error::Error + Send + Sync>>
where
    B: Bus + Send + 'static,
{
    let sensor_id: Arc<str> = sensor_id.into();
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut sequence_counter = 0u64;
    let mut kept = Vec::new();

    info!("[{}] Starting sampler every {:?}", sensor_id, period);

    loop {
        if max_samples.is_some_and(|max| sequence_counter >= max) {
            return Ok(kept);
        }
        ticker.tick().await;

        let seq = sequence_counter + 1;
        let sensor = Arc::clone(&sensor);
        let id = Arc::clone(&sensor_id);
        let result = tokio::task::spawn_blocking(move || {
            let mut guard = sensor.lock().map_err(|_| SensorError::LockPoisoned)?;
            guard.read_all(&id, seq)
        })
        .await?;

        match result {
            Ok(reading) => {
                sequence_counter = seq;
                match reading.to_json() {
                    Ok(json) => info!("[{}] {}", sensor_id, json),
                    Err(e) => error!("[{}] Failed to encode reading: {}", sensor_id, e),
                }
                if max_samples.is_some() {
                    kept.push(reading);
                }
            }
            Err(SensorError::LockPoisoned) => return Err(Box::new(SensorError::LockPoisoned)),
            Err(e) => error!("[{}] Sensor read error: {}", sensor_id, e),
        }
    }
}
