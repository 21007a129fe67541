//! Histogram of Oriented Gradients descriptor.
//!
//! Gradients are central differences (zero on the image border), orientations
//! are unsigned in `[0, 180)` degrees and hard-binned, each cell histogram is
//! the magnitude sum divided by the cell area, and cells are grouped into
//! overlapping blocks with a stride of one cell. The flattened descriptor is
//! ordered block row, block column, cell row, cell column, orientation.

use serde::{Deserialize, Serialize};

use crate::error::HogError;
use crate::preprocess::GrayFrame;

const NORM_EPS: f64 = 1e-5;
const HYS_CLIP: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlockNorm {
    L1,
    #[serde(rename = "L1-sqrt")]
    L1Sqrt,
    L2,
    #[default]
    #[serde(rename = "L2-Hys")]
    L2Hys,
}

/// Parameters of the HOG descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HogConfig {
    /// Number of orientation bins over `[0, 180)`.
    pub orientations: usize,
    /// Cell size as `(rows, cols)` in pixels.
    pub pixels_per_cell: (usize, usize),
    /// Block size as `(rows, cols)` in cells.
    pub cells_per_block: (usize, usize),
    pub block_norm: BlockNorm,
}

impl Default for HogConfig {
    fn default() -> Self {
        HogConfig {
            orientations: 9,
            pixels_per_cell: (8, 8),
            cells_per_block: (3, 3),
            block_norm: BlockNorm::L2Hys,
        }
    }
}

impl HogConfig {
    pub fn with_orientations(mut self, orientations: usize) -> Self {
        self.orientations = orientations;
        self
    }

    pub fn with_pixels_per_cell(mut self, rows: usize, cols: usize) -> Self {
        self.pixels_per_cell = (rows, cols);
        self
    }

    pub fn with_cells_per_block(mut self, rows: usize, cols: usize) -> Self {
        self.cells_per_block = (rows, cols);
        self
    }

    pub fn with_block_norm(mut self, block_norm: BlockNorm) -> Self {
        self.block_norm = block_norm;
        self
    }

    pub fn validate(&self) -> Result<(), HogError> {
        if self.orientations < 1 {
            return Err(HogError::InvalidConfig("orientations must be >= 1".into()));
        }
        let (pr, pc) = self.pixels_per_cell;
        if pr < 1 || pc < 1 {
            return Err(HogError::InvalidConfig(format!(
                "pixels_per_cell must be >= 1 (got {pr}x{pc})"
            )));
        }
        let (br, bc) = self.cells_per_block;
        if br < 1 || bc < 1 {
            return Err(HogError::InvalidConfig(format!(
                "cells_per_block must be >= 1 (got {br}x{bc})"
            )));
        }
        Ok(())
    }

    /// Descriptor length for an image of the given size, or `None` if the
    /// image cannot hold a single block or the config is invalid.
    pub fn descriptor_len(&self, width: usize, height: usize) -> Option<usize> {
        self.validate().ok()?;
        let (blocks_row, blocks_col) = self.block_grid(width, height)?;
        let (br, bc) = self.cells_per_block;
        Some(blocks_row * blocks_col * br * bc * self.orientations)
    }

    fn cell_grid(&self, width: usize, height: usize) -> (usize, usize) {
        (height / self.pixels_per_cell.0, width / self.pixels_per_cell.1)
    }

    fn block_grid(&self, width: usize, height: usize) -> Option<(usize, usize)> {
        let (cells_row, cells_col) = self.cell_grid(width, height);
        let (br, bc) = self.cells_per_block;
        if cells_row < br || cells_col < bc {
            return None;
        }
        Some((cells_row - br + 1, cells_col - bc + 1))
    }
}

/// Per-pixel gradient magnitude and unsigned orientation in degrees.
fn gradients(frame: &GrayFrame) -> (Vec<f64>, Vec<f64>) {
    let (w, h) = (frame.width, frame.height);
    let mut magnitude = vec![0.0; w * h];
    let mut orientation = vec![0.0; w * h];
    for row in 0..h {
        for col in 0..w {
            let g_row = if row > 0 && row + 1 < h {
                frame.get(row + 1, col) - frame.get(row - 1, col)
            } else {
                0.0
            };
            let g_col = if col > 0 && col + 1 < w {
                frame.get(row, col + 1) - frame.get(row, col - 1)
            } else {
                0.0
            };
            let idx = row * w + col;
            magnitude[idx] = g_row.hypot(g_col);
            orientation[idx] = g_row.atan2(g_col).to_degrees().rem_euclid(180.0);
        }
    }
    (magnitude, orientation)
}

/// Orientation histograms for every cell, laid out `[cell_row][cell_col][bin]`.
fn cell_histograms(frame: &GrayFrame, cfg: &HogConfig) -> Vec<f64> {
    let (magnitude, orientation) = gradients(frame);
    let (cells_row, cells_col) = cfg.cell_grid(frame.width, frame.height);
    let (pr, pc) = cfg.pixels_per_cell;
    let bins = cfg.orientations;
    let bin_width = 180.0 / bins as f64;
    let area = (pr * pc) as f64;

    let mut hist = vec![0.0; cells_row * cells_col * bins];
    for cr in 0..cells_row {
        for cc in 0..cells_col {
            let base = (cr * cells_col + cc) * bins;
            for row in cr * pr..(cr + 1) * pr {
                for col in cc * pc..(cc + 1) * pc {
                    let idx = row * frame.width + col;
                    let bin = ((orientation[idx] / bin_width) as usize).min(bins - 1);
                    hist[base + bin] += magnitude[idx];
                }
            }
            for value in &mut hist[base..base + bins] {
                *value /= area;
            }
        }
    }
    hist
}

fn normalize_block(block: &mut [f64], method: BlockNorm) {
    match method {
        BlockNorm::L1 => {
            let norm = block.iter().map(|v| v.abs()).sum::<f64>() + NORM_EPS;
            block.iter_mut().for_each(|v| *v /= norm);
        }
        BlockNorm::L1Sqrt => {
            let norm = block.iter().map(|v| v.abs()).sum::<f64>() + NORM_EPS;
            block.iter_mut().for_each(|v| *v = (*v / norm).sqrt());
        }
        BlockNorm::L2 => l2_normalize(block),
        BlockNorm::L2Hys => {
            l2_normalize(block);
            block.iter_mut().for_each(|v| *v = v.min(HYS_CLIP));
            l2_normalize(block);
        }
    }
}

fn l2_normalize(block: &mut [f64]) {
    let norm = (block.iter().map(|v| v * v).sum::<f64>() + NORM_EPS * NORM_EPS).sqrt();
    block.iter_mut().for_each(|v| *v /= norm);
}

/// Computes the flattened HOG descriptor of a grayscale frame.
pub fn hog_features(frame: &GrayFrame, cfg: &HogConfig) -> Result<Vec<f64>, HogError> {
    cfg.validate()?;
    let (br, bc) = cfg.cells_per_block;
    let (blocks_row, blocks_col) =
        cfg.block_grid(frame.width, frame.height).ok_or(HogError::ImageTooSmall {
            width: frame.width,
            height: frame.height,
            block_width: bc * cfg.pixels_per_cell.1,
            block_height: br * cfg.pixels_per_cell.0,
        })?;

    let hist = cell_histograms(frame, cfg);
    let (_, cells_col) = cfg.cell_grid(frame.width, frame.height);
    let bins = cfg.orientations;
    let block_len = br * bc * bins;

    let mut features = Vec::with_capacity(blocks_row * blocks_col * block_len);
    let mut block = Vec::with_capacity(block_len);
    for r in 0..blocks_row {
        for c in 0..blocks_col {
            block.clear();
            for cr in r..r + br {
                for cc in c..c + bc {
                    let base = (cr * cells_col + cc) * bins;
                    block.extend_from_slice(&hist[base..base + bins]);
                }
            }
            normalize_block(&mut block, cfg.block_norm);
            features.extend_from_slice(&block);
        }
    }
    Ok(features)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_from_fn(width: usize, height: usize, f: impl Fn(usize, usize) -> f64) -> GrayFrame {
        let pixels = (0..height)
            .flat_map(|r| (0..width).map(move |c| (r, c)))
            .map(|(r, c)| f(r, c))
            .collect();
        GrayFrame::new(width, height, pixels).unwrap()
    }

    #[test]
    fn test_default_config() {
        let cfg = HogConfig::default();
        assert_eq!(cfg.orientations, 9);
        assert_eq!(cfg.pixels_per_cell, (8, 8));
        assert_eq!(cfg.cells_per_block, (3, 3));
        assert_eq!(cfg.block_norm, BlockNorm::L2Hys);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_descriptor_length() {
        let cfg = HogConfig::default();
        // 64x32 px -> 4x8 cells -> 2x6 blocks
        let frame = frame_from_fn(64, 32, |r, c| ((r * 7 + c * 3) % 11) as f64 / 10.0);
        let features = hog_features(&frame, &cfg).unwrap();
        assert_eq!(features.len(), 2 * 6 * 3 * 3 * 9);
        assert_eq!(cfg.descriptor_len(64, 32), Some(features.len()));
    }

    #[test]
    fn test_image_too_small() {
        let frame = frame_from_fn(16, 40, |_, _| 0.5);
        let err = hog_features(&frame, &HogConfig::default()).unwrap_err();
        assert_eq!(
            err,
            HogError::ImageTooSmall { width: 16, height: 40, block_width: 24, block_height: 24 }
        );
    }

    #[test]
    fn test_invalid_config() {
        let frame = frame_from_fn(32, 32, |_, _| 0.0);
        let cfg = HogConfig::default().with_orientations(0);
        assert!(matches!(hog_features(&frame, &cfg), Err(HogError::InvalidConfig(_))));
    }

    #[test]
    fn test_flat_image_has_zero_descriptor() {
        let frame = frame_from_fn(32, 32, |_, _| 0.3);
        let features = hog_features(&frame, &HogConfig::default()).unwrap();
        assert!(features.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_vertical_edges_fill_horizontal_gradient_bin() {
        // Intensity varies along columns only: gradient angle is 0 degrees.
        let cfg = HogConfig::default()
            .with_pixels_per_cell(4, 4)
            .with_cells_per_block(1, 1)
            .with_block_norm(BlockNorm::L1);
        let frame = frame_from_fn(12, 12, |_, c| c as f64 / 12.0);
        let features = hog_features(&frame, &cfg).unwrap();
        // centre cell has no border pixels
        let centre = &features[4 * 9..5 * 9];
        assert!(centre[0] > 0.99);
        assert!(centre[1..].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_l2_hys_is_clipped_and_unit_length() {
        let mut block = vec![10.0, 1.0, 1.0, 1.0];
        normalize_block(&mut block, BlockNorm::L2Hys);
        let norm = block.iter().map(|v| v * v).sum::<f64>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
        // plain L2 would leave the first component at ~0.985
        assert!(block[0] < 0.8);
    }

    #[test]
    fn test_block_norm_serde_names() {
        assert_eq!(serde_json::to_string(&BlockNorm::L2Hys).unwrap(), "\"L2-Hys\"");
        let cfg: HogConfig = serde_json::from_str(r#"{"block_norm": "L1-sqrt"}"#).unwrap();
        assert_eq!(cfg.block_norm, BlockNorm::L1Sqrt);
        assert_eq!(cfg.orientations, 9);
    }
}
