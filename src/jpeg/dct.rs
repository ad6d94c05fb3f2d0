//! Forward discrete cosine transform on 8×8 blocks.
//!
//! Separable: an 8-point 1-D transform over every row, then over every column.
//! The 1-D kernel is the Vetterli–Ligtenberg factorization, which needs only
//! the seven constants `cos(kπ/16)` for `k = 1..=7`.
//!
//! Each 1-D pass yields twice the orthonormal DCT-II, so [`dct_2d`] returns
//! four times the JPEG FDCT. The quantizer divides the factor back out
//! (see [`super::quantize::quantize_block`]).

/// `cos(kπ/16)`, indexed by `k - 1`.
const C1: f64 = 0.980_785_280_403_230_4;
const C2: f64 = 0.923_879_532_511_286_7;
const C3: f64 = 0.831_469_612_302_545_2;
const C4: f64 = 0.707_106_781_186_547_6;
const C5: f64 = 0.555_570_233_019_602_2;
const C6: f64 = 0.382_683_432_365_089_8;
const C7: f64 = 0.195_090_322_016_128_25;

/// Scale of [`dct_2d`] output relative to the JPEG FDCT.
pub const DCT_SCALE: f64 = 4.0;

/// 8-point forward DCT on `data[offset + k * stride]`, `k = 0..8`, in place.
#[inline(always)]
fn fdct_1d(data: &mut [f64; 64], offset: usize, stride: usize) {
    let x = |k: usize| data[offset + k * stride];

    let s07 = x(0) + x(7);
    let s12 = x(1) + x(2);
    let s34 = x(3) + x(4);
    let s56 = x(5) + x(6);

    let d07 = x(0) - x(7);
    let d12 = x(1) - x(2);
    let d34 = x(3) - x(4);
    let d56 = x(5) - x(6);

    let ss07s34 = s07 + s34;
    let ss12s56 = s12 + s56;
    let sd12d56 = d12 + d56;
    let dd12d56 = d12 - d56;
    let ds07s34 = s07 - s34;
    let ds12s56 = s12 - s56;

    let c4_ds12s56 = C4 * ds12s56;
    let c4_sd12d56 = C4 * sd12d56;

    let out = [
        C4 * (ss07s34 + ss12s56),
        C1 * (d07 + c4_ds12s56) - C7 * (-d34 - c4_sd12d56),
        C6 * dd12d56 + C2 * ds07s34,
        C3 * (d07 - c4_ds12s56) - C5 * (d34 - c4_sd12d56),
        C4 * (ss07s34 - ss12s56),
        C5 * (d07 - c4_ds12s56) + C3 * (d34 - c4_sd12d56),
        -C2 * dd12d56 + C6 * ds07s34,
        C7 * (d07 + c4_ds12s56) + C1 * (-d34 - c4_sd12d56),
    ];

    for (k, v) in out.into_iter().enumerate() {
        data[offset + k * stride] = v;
    }
}

/// 2-D forward DCT of a level-shifted block (natural row-major order).
///
/// Output is scaled by [`DCT_SCALE`] relative to the JPEG definition
/// `F(u,v) = ¼ C(u) C(v) Σ Σ f(x,y) cos(...) cos(...)`.
pub fn dct_2d(block: &[f64; 64]) -> [f64; 64] {
    let mut data = *block;
    for row in 0..8 {
        fdct_1d(&mut data, row * 8, 1);
    }
    for col in 0..8 {
        fdct_1d(&mut data, col, 8);
    }
    data
}
