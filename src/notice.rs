// notice.rs — 提示框 (transient message overlay with delayed fade-out)

use pano_player::Notice;
use std::time::{Duration, Instant};

const TRANSITION_DELAY: Duration = Duration::from_millis(1000);
const HIDDEN_DELAY: Duration = Duration::from_millis(3000);

#[derive(Default)]
pub struct NoticeWidget {
    fade_started: Option<Instant>,
}

impl NoticeWidget {
    /// Opacity for this frame, `None` when nothing should be drawn.
    pub fn opacity(&mut self, notice: Option<&Notice>) -> Option<f32> {
        let notice = notice?;
        if !notice.visible {
            return None;
        }
        if !notice.fading {
            return Some(1.0);
        }

        let started = *self.fade_started.get_or_insert_with(Instant::now);
        let elapsed = started.elapsed();
        if elapsed < TRANSITION_DELAY {
            Some(1.0)
        } else if elapsed < HIDDEN_DELAY {
            let t = (elapsed - TRANSITION_DELAY).as_secs_f32()
                / (HIDDEN_DELAY - TRANSITION_DELAY).as_secs_f32();
            Some(1.0 - t)
        } else {
            None
        }
    }

    pub fn draw(&mut self, ctx: &egui::Context, notice: Option<&Notice>) {
        let (Some(alpha), Some(notice)) = (self.opacity(notice), notice) else {
            return;
        };
        let a = (alpha * 255.0) as u8;
        egui::Area::new("pano_notice")
            .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::none()
                    .fill(egui::Color32::from_black_alpha((a as f32 * 0.7) as u8))
                    .rounding(6.0)
                    .inner_margin(egui::Margin::same(12.0))
                    .show(ui, |ui| {
                        ui.label(
                            egui::RichText::new(&notice.message)
                                .color(egui::Color32::from_white_alpha(a))
                                .size(18.0),
                        );
                    });
            });
    }
}
