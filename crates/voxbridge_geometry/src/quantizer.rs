//! # Color Quantizer
//!
//! Reduces an arbitrary list of face colors to at most 255 palette entries.
//!
//! ## Algorithm
//!
//! 1. Drop exact duplicates, keeping first-seen order.
//! 2. 255 or fewer distinct colors: index `i` in first-seen order gets palette
//!    index `i + 1`. Done.
//! 3. Otherwise merge the two closest clusters (squared RGBA distance) until
//!    255 remain. Ties go to the lexicographically lowest `(first, second)`
//!    pair of first-seen positions. The merged cluster takes the
//!    sample-count-weighted mean color and stays in the earlier slot.
//!
//! This is a greedy approximation, not an optimal palette. It is fully
//! deterministic for a fixed input order.
//!
//! Each cluster caches its nearest later neighbour, so one merge only rescans
//! the clusters whose cached neighbour changed.

use std::collections::HashMap;

use voxbridge_format::{Palette, Rgba};

use crate::error::{GeometryError, GeometryResult};

/// Addressable palette entries.
pub const MAX_COLORS: usize = 255;

/// Quantized palette plus the mapping from every sampled color to its index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantizedPalette {
    palette: Palette,
    index_of: HashMap<Rgba, u8>,
    used: usize,
}

impl QuantizedPalette {
    /// The palette (unused entries keep the default colors).
    #[must_use]
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Consumes self, returning the palette.
    #[must_use]
    pub fn into_palette(self) -> Palette {
        self.palette
    }

    /// Palette index assigned to a sampled color.
    #[must_use]
    pub fn index_of(&self, color: Rgba) -> Option<u8> {
        self.index_of.get(&color).copied()
    }

    /// Number of palette entries in use (1..=255).
    #[must_use]
    pub fn used(&self) -> usize {
        self.used
    }

    /// Maps each sample to its index, in sample order.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Validation`] for a color that was not part of
    /// the quantized input.
    pub fn indices(&self, samples: &[Rgba]) -> GeometryResult<Vec<u8>> {
        samples
            .iter()
            .map(|&c| {
                self.index_of(c).ok_or_else(|| {
                    GeometryError::Validation(format!("color {c:?} was not quantized"))
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
struct Cluster {
    color: Rgba,
    sums: [u64; 4],
    count: u64,
    alive: bool,
}

impl Cluster {
    fn absorb(&mut self, other: &Self) {
        for (s, o) in self.sums.iter_mut().zip(other.sums.iter()) {
            *s += o;
        }
        self.count += other.count;
        let mean = |sum: u64| u8::try_from((sum + self.count / 2) / self.count).unwrap_or(u8::MAX);
        self.color = Rgba::new(
            mean(self.sums[0]),
            mean(self.sums[1]),
            mean(self.sums[2]),
            mean(self.sums[3]),
        );
    }
}

/// Quantizes face color samples.
///
/// With zero samples the palette holds `fallback` at index 1, or fails with
/// [`GeometryError::EmptyInput`] when no fallback is given.
///
/// # Errors
///
/// [`GeometryError::EmptyInput`] as described above.
pub fn quantize(samples: &[Rgba], fallback: Option<Rgba>) -> GeometryResult<QuantizedPalette> {
    if samples.is_empty() {
        let color = fallback.ok_or_else(|| {
            GeometryError::EmptyInput("no color samples and no fallback color".to_string())
        })?;
        let mut palette = Palette::default();
        palette.set(1, color);
        let index_of = HashMap::from([(color, 1)]);
        return Ok(QuantizedPalette { palette, index_of, used: 1 });
    }

    // Dedup in first-seen order, counting occurrences.
    let mut slot_of: HashMap<Rgba, usize> = HashMap::new();
    let mut clusters: Vec<Cluster> = Vec::new();
    for &color in samples {
        let slot = *slot_of.entry(color).or_insert_with(|| {
            clusters.push(Cluster {
                color,
                sums: [0; 4],
                count: 0,
                alive: true,
            });
            clusters.len() - 1
        });
        let cluster = &mut clusters[slot];
        cluster.count += 1;
        for (s, ch) in cluster.sums.iter_mut().zip([color.r, color.g, color.b, color.a]) {
            *s += u64::from(ch);
        }
    }

    let distinct = clusters.len();
    let owner = if distinct > MAX_COLORS {
        merge_clusters(&mut clusters)
    } else {
        (0..distinct).collect()
    };

    // Surviving clusters, in first-seen order, get indices 1..
    let mut palette = Palette::default();
    let mut index_for_slot = vec![0u8; distinct];
    let mut next = 1u8;
    for (slot, cluster) in clusters.iter().enumerate() {
        if cluster.alive {
            palette.set(next, cluster.color);
            index_for_slot[slot] = next;
            next = next.saturating_add(1);
        }
    }
    let used = clusters.iter().filter(|c| c.alive).count();

    let index_of = slot_of
        .into_iter()
        .map(|(color, slot)| (color, index_for_slot[owner[slot]]))
        .collect();

    tracing::debug!("Quantized {} samples, {} distinct colors into {} palette entries", samples.len(), distinct, used);

    Ok(QuantizedPalette { palette, index_of, used })
}

/// Greedy pairwise merging down to [`MAX_COLORS`]. Returns, for every original
/// slot, the slot of the cluster that absorbed it.
fn merge_clusters(clusters: &mut [Cluster]) -> Vec<usize> {
    let n = clusters.len();
    let mut owner: Vec<usize> = (0..n).collect();
    // nearest[i] = closest alive j > i, as (distance, j)
    let mut nearest: Vec<Option<(u32, usize)>> = (0..n).map(|i| scan_nearest(clusters, i)).collect();
    let mut alive = n;

    while alive > MAX_COLORS {
        let Some((_, keep, gone)) = nearest
            .iter()
            .enumerate()
            .filter(|(i, _)| clusters[*i].alive)
            .filter_map(|(i, nn)| nn.map(|(d, j)| (d, i, j)))
            .min()
        else {
            break;
        };

        let absorbed = clusters[gone].clone();
        clusters[keep].absorb(&absorbed);
        clusters[gone].alive = false;
        nearest[gone] = None;
        alive -= 1;
        for o in &mut owner {
            if *o == gone {
                *o = keep;
            }
        }

        for k in 0..n {
            if !clusters[k].alive {
                continue;
            }
            if k == keep {
                nearest[k] = scan_nearest(clusters, k);
                continue;
            }
            match nearest[k] {
                Some((_, j)) if j == keep || j == gone => {
                    nearest[k] = scan_nearest(clusters, k);
                }
                Some((d, j)) if k < keep => {
                    let dk = clusters[k].color.distance_squared(clusters[keep].color);
                    if (dk, keep) < (d, j) {
                        nearest[k] = Some((dk, keep));
                    }
                }
                _ => {}
            }
        }
    }
    owner
}

fn scan_nearest(clusters: &[Cluster], i: usize) -> Option<(u32, usize)> {
    let color = clusters[i].color;
    clusters
        .iter()
        .enumerate()
        .skip(i + 1)
        .filter(|(_, c)| c.alive)
        .map(|(j, c)| (color.distance_squared(c.color), j))
        .min()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(clippy::cast_possible_truncation)]
    fn spread(n: usize) -> Vec<Rgba> {
        (0..n)
            .map(|i| Rgba::opaque((i % 256) as u8, ((i / 256) * 40) as u8, ((i * 7) % 256) as u8))
            .collect()
    }

    #[test]
    fn test_first_seen_order() {
        let a = Rgba::opaque(255, 0, 0);
        let b = Rgba::opaque(0, 255, 0);
        let q = quantize(&[b, a, b, a], None).unwrap();
        assert_eq!(q.index_of(b), Some(1));
        assert_eq!(q.index_of(a), Some(2));
        assert_eq!(q.used(), 2);
        assert_eq!(q.palette().get(1), b);
        // Unused slots keep defaults.
        assert_eq!(q.palette().get(3), Palette::default().get(3));
    }

    #[test]
    fn test_exactly_255_not_merged() {
        let samples = spread(255);
        let q = quantize(&samples, None).unwrap();
        assert_eq!(q.used(), 255);
        for (i, &c) in samples.iter().enumerate() {
            assert_eq!(q.index_of(c), Some(u8::try_from(i + 1).unwrap()));
        }
    }

    #[test]
    fn test_cap_and_total_mapping() {
        let samples = spread(600);
        let q = quantize(&samples, None).unwrap();
        assert_eq!(q.used(), MAX_COLORS);
        let indices = q.indices(&samples).unwrap();
        assert_eq!(indices.len(), samples.len());
        assert!(indices.iter().all(|&i| i >= 1));
    }

    #[test]
    fn test_merge_picks_closest_pair_and_weights_mean() {
        let mut samples = spread(255);
        // Closest pair: a new color 1 away from sample 0.
        let near = Rgba::opaque(0, 0, 1);
        samples.push(near);
        samples.push(near);
        samples.push(near);

        let q = quantize(&samples, None).unwrap();
        assert_eq!(q.used(), 255);
        assert_eq!(q.index_of(samples[0]), Some(1));
        assert_eq!(q.index_of(near), Some(1));
        // (0 * 1 + 1 * 3) / 4 rounds to 1.
        assert_eq!(q.palette().get(1), Rgba::opaque(0, 0, 1));
    }

    #[test]
    fn test_deterministic() {
        let samples = spread(400);
        assert_eq!(quantize(&samples, None).unwrap(), quantize(&samples, None).unwrap());
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(quantize(&[], None), Err(GeometryError::EmptyInput(_))));
        let q = quantize(&[], Some(Rgba::NEUTRAL_GRAY)).unwrap();
        assert_eq!(q.palette().get(1), Rgba::NEUTRAL_GRAY);
        assert_eq!(q.index_of(Rgba::NEUTRAL_GRAY), Some(1));
    }
}
