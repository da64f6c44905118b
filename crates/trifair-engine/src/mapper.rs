// Path: crates/trifair-engine/src/mapper.rs
//! C4: deterministic entropy-to-grid and entropy-to-reel-position mapping.

use trifair_crypto::hash::hmac_sha256;
use trifair_types::config::GameConfig;
use trifair_types::entropy::{ClientSeed, CombinedEntropy, Digest32, ThetaVector};
use trifair_types::error::EngineError;
use trifair_types::grid::{ReelPositions, Symbol, SymbolGrid};

/// `U32(n) = first 8 hex chars of HMAC-SHA256(combinedEntropy, "position:"||n)`,
/// interpreted as a big-endian unsigned 32-bit integer.
fn u32_word(combined: &CombinedEntropy, n: u64) -> u32 {
    let mac = hmac_sha256(combined.as_bytes(), format!("position:{n}").as_bytes());
    u32::from_be_bytes([mac[0], mac[1], mac[2], mac[3]])
}

/// `F(n) = first 8 hex chars of HMAC-SHA256(combinedEntropy, "float:"||n)`,
/// interpreted as a big-endian u32 divided by `0xFFFFFFFF`.
fn f_word(combined: &CombinedEntropy, n: u64) -> f64 {
    let mac = hmac_sha256(combined.as_bytes(), format!("float:{n}").as_bytes());
    let v = u32::from_be_bytes([mac[0], mac[1], mac[2], mac[3]]);
    v as f64 / u32::MAX as f64
}

/// Three angles in `[0, 2*pi)`, one per disjoint 4-byte big-endian word of
/// `digest`, as a uniform fraction of `2*pi` (§3 Theta Vector).
pub fn theta_vector_from_digest(digest: &Digest32) -> ThetaVector {
    let bytes = digest.as_bytes();
    let mut out = [0.0_f64; 3];
    for (i, slot) in out.iter_mut().enumerate() {
        let start = i * 4;
        let word = u32::from_be_bytes([
            bytes[start],
            bytes[start + 1],
            bytes[start + 2],
            bytes[start + 3],
        ]);
        // Divide by 2^32, not u32::MAX, so word == 0xFFFFFFFF lands just
        // short of TAU rather than exactly on it (§3: theta is [0, 2*pi)).
        *slot = (word as f64 / (u32::MAX as f64 + 1.0)) * std::f64::consts::TAU;
    }
    ThetaVector(out)
}

/// Fills `grid[column][row]` from `combined`, honoring wild/bonus/gold spawn
/// rules (§4.4). `column` iterates outermost, `row` innermost, and the cell
/// counter `p` is monotonic across the whole grid — reordering either loop
/// or the counter changes every output downstream.
pub fn map_grid(combined: &CombinedEntropy, config: &GameConfig) -> Result<SymbolGrid, EngineError> {
    config.validate().map_err(EngineError::InvalidInput)?;

    let base_pool: Vec<&str> = config
        .symbols
        .iter()
        .map(String::as_str)
        .filter(|s| *s != Symbol::WILD && *s != Symbol::BONUS)
        .collect();
    if base_pool.is_empty() {
        return Err(EngineError::InvalidInput(
            "symbol pool has no base symbols outside wild/bonus".to_string(),
        ));
    }

    let rows = config.rows();
    let mut columns = Vec::with_capacity(config.reel_count as usize);
    let mut p: u64 = 0;

    for column in 0..config.reel_count {
        let mut cells = Vec::with_capacity(rows as usize);
        let mut bonus_placed_in_visible = false;

        for row in 0..rows {
            p += 1;
            let is_visible = row >= config.buffer_rows && row < config.buffer_rows + config.visible_rows;

            if f_word(combined, 4 * p) < config.spawn_rates.wild_chance {
                cells.push(Symbol::wild());
                continue;
            }

            if is_visible
                && !bonus_placed_in_visible
                && f_word(combined, 4 * p + 1) < config.spawn_rates.bonus_chance
            {
                cells.push(Symbol::bonus());
                bonus_placed_in_visible = true;
                continue;
            }

            let base_index = (u32_word(combined, 4 * p + 2) as usize) % base_pool.len();
            let base_name = base_pool.get(base_index).copied().unwrap_or("");
            let gold_eligible =
                f_word(combined, 4 * p + 3) < config.spawn_rates.gold_chance && config.gold_allowed_columns.contains(&column);
            cells.push(if gold_eligible {
                Symbol::gilded(base_name)
            } else {
                Symbol(base_name.to_string())
            });
        }
        columns.push(cells);
    }

    Ok(SymbolGrid { columns })
}

/// `position[r] = U32-of-HMAC(combinedEntropy, clientSeed||":"||nonce||":"||r) mod symbolsPerReel` (§4.4 reel-position mode).
pub fn map_reel_positions(
    combined: &CombinedEntropy,
    client_seed: &ClientSeed,
    nonce: u64,
    reel_count: u32,
    symbols_per_reel: u32,
) -> Result<ReelPositions, EngineError> {
    if symbols_per_reel == 0 {
        return Err(EngineError::InvalidInput(
            "symbols_per_reel must be >= 1".to_string(),
        ));
    }

    let mut positions = Vec::with_capacity(reel_count as usize);
    for r in 0..reel_count {
        let mut message = Vec::with_capacity(client_seed.mixing_bytes().len() + 16);
        message.extend_from_slice(client_seed.mixing_bytes());
        message.extend_from_slice(format!(":{nonce}:{r}").as_bytes());
        let mac = hmac_sha256(combined.as_bytes(), &message);
        let v = u32::from_be_bytes([mac[0], mac[1], mac[2], mac[3]]);
        positions.push(v % symbols_per_reel);
    }
    Ok(ReelPositions { positions })
}

/// Auxiliary reel-position formula used by the verify path, reproducible
/// from `thetaVector` alone without replaying the grid algorithm (§4.4
/// Theta mixing): `position[r] = floor((theta[r mod 3]/(2*pi) + byte_r/255) * |symbols|) mod |symbols|`,
/// where `byte_r` is the `r`-th byte (mod 32) of `combined`.
pub fn map_theta_positions(
    theta: &ThetaVector,
    combined: &CombinedEntropy,
    reel_count: u32,
    symbol_count: u32,
) -> Result<ReelPositions, EngineError> {
    if symbol_count == 0 {
        return Err(EngineError::InvalidInput(
            "symbol_count must be >= 1".to_string(),
        ));
    }

    let bytes = combined.as_bytes();
    let mut positions = Vec::with_capacity(reel_count as usize);
    for r in 0..reel_count {
        let byte_r = bytes[(r as usize) % bytes.len()] as f64;
        let frac = theta.get(r as usize) / std::f64::consts::TAU + byte_r / 255.0;
        let idx = (frac * symbol_count as f64).floor() as i64;
        let pos = idx.rem_euclid(symbol_count as i64) as u32;
        positions.push(pos);
    }
    Ok(ReelPositions { positions })
}
