use crate::db::core::{BoardDB, ItemData};
use crate::error::BoardError;
use crate::geom::rect::Rect;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

const CHECK_TOLERANCE: f64 = 1e-6;

// Geometry oddities are logged; only a bad outline or negative pad
// geometry is fatal.
pub fn run_board_check(db: &BoardDB) -> Result<(), BoardError> {
    log::info!("Starting board sanity check...");

    let rings = db.outline_polygons()?;

    let mut envelope: Option<Rect> = None;
    for ring in &rings {
        let r = Rect::from_points(ring);
        envelope = Some(match envelope {
            Some(mut e) => {
                e.expand_to(r.min);
                e.expand_to(r.max);
                e
            }
            None => r,
        });
    }

    let valid = AtomicBool::new(true);
    let first_error = Mutex::new(String::new());

    db.items.par_iter().enumerate().for_each(|(i, item)| {
        if let ItemData::Pad(p) = item {
            if p.radius < -CHECK_TOLERANCE || p.drill < -CHECK_TOLERANCE {
                let msg = format!("pad #{} has negative geometry", i);
                log::error!("FAIL: {}", msg);
                valid.store(false, Ordering::Relaxed);
                let mut guard = first_error.lock().unwrap();
                if guard.is_empty() {
                    *guard = msg;
                }
            }
            if !p.plated && p.drill > 0.0 && p.net.is_some() {
                log::warn!("pad #{} is NPTH but carries a net; net ignored for creepage", i);
            }
            if let Some(env) = envelope {
                if p.net.is_some() && !env.inflated(CHECK_TOLERANCE).contains(p.position) {
                    log::warn!("pad #{} sits outside the board outline", i);
                }
            }
        }
    });

    if valid.load(Ordering::Relaxed) {
        log::info!("Board sanity check passed ({} outline rings).", rings.len());
        Ok(())
    } else {
        Err(BoardError::CheckFailed(first_error.into_inner().unwrap()))
    }
}
