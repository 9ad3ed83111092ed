//! Native monitor capture through `xcap`.

use deskreel_capture_model::MonitorFrame;
use deskreel_common::error::{DeskreelError, DeskreelResult};
use deskreel_platform_core::{stitch_order, MonitorInfo};
use image::DynamicImage;
use xcap::Monitor;

use super::MonitorCapture;

#[derive(Debug, Default, Clone, Copy)]
pub struct XcapCapture;

impl MonitorCapture for XcapCapture {
    fn capture_monitors(&self) -> DeskreelResult<Vec<MonitorFrame>> {
        let monitors = Monitor::all()
            .map_err(|e| DeskreelError::acquisition(format!("cannot enumerate monitors: {e}")))?;
        if monitors.is_empty() {
            return Err(DeskreelError::format("no monitors reported"));
        }

        let mut grabbed = Vec::with_capacity(monitors.len());
        for monitor in monitors {
            let info = describe(&monitor)?;
            let image = monitor.capture_image().map_err(|e| {
                DeskreelError::acquisition(format!("cannot capture {}: {e}", info.name))
            })?;
            grabbed.push((info, image));
        }

        let mut layout: Vec<MonitorInfo> = grabbed.iter().map(|(info, _)| info.clone()).collect();
        stitch_order(&mut layout);

        let mut frames = Vec::with_capacity(grabbed.len());
        for info in &layout {
            if let Some(pos) = grabbed.iter().position(|(g, _)| g == info) {
                let (info, image) = grabbed.swap_remove(pos);
                frames.push(MonitorFrame::new(info.name, DynamicImage::ImageRgba8(image)));
            }
        }
        Ok(frames)
    }

    fn name(&self) -> &str {
        "xcap"
    }
}

fn describe(monitor: &Monitor) -> DeskreelResult<MonitorInfo> {
    let query = |e: xcap::XCapError| DeskreelError::acquisition(format!("monitor query failed: {e}"));
    Ok(MonitorInfo {
        name: monitor.name().map_err(query)?,
        width: monitor.width().map_err(query)?,
        height: monitor.height().map_err(query)?,
        x: monitor.x().map_err(query)?,
        y: monitor.y().map_err(query)?,
        primary: monitor.is_primary().unwrap_or(false),
    })
}
