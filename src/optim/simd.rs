//! SIMD-accelerated parameter update kernels via Trueno
//!
//! Vectorized Adam update built on Trueno's multi-backend SIMD vectors,
//! fusing the moment updates and the parameter write into one call.
//! `Device::preferred` decides whether this path is taken; the scalar
//! ndarray path in `Adam` produces identical results.

use trueno::vector::Vector;

/// SIMD-accelerated Adam update: advances both moment estimates and writes
/// the bias-corrected parameter update in place.
#[allow(clippy::too_many_arguments)]
pub fn fused_adam_update(
    grad: &[f32],
    m: &mut [f32],
    v: &mut [f32],
    param: &mut [f32],
    beta1: f32,
    beta2: f32,
    lr_t: f32,
    epsilon: f32,
) {
    assert_eq!(grad.len(), m.len(), "moment length must match gradient");
    assert_eq!(grad.len(), v.len(), "moment length must match gradient");
    assert_eq!(grad.len(), param.len(), "param length must match gradient");

    let grad_vec = Vector::from_slice(grad);
    let m_vec = Vector::from_slice(m);
    let v_vec = Vector::from_slice(v);
    let param_vec = Vector::from_slice(param);

    // m_t = β1 * m + (1 - β1) * g
    let m_scaled = m_vec.scale(beta1).expect("Scale m failed");
    let grad_scaled = grad_vec.scale(1.0 - beta1).expect("Scale grad failed");
    let m_new = m_scaled.add(&grad_scaled).expect("Add m failed");

    // v_t = β2 * v + (1 - β2) * g²
    let grad_sq = grad_vec.mul(&grad_vec).expect("Square grad failed");
    let v_scaled = v_vec.scale(beta2).expect("Scale v failed");
    let grad_sq_scaled = grad_sq.scale(1.0 - beta2).expect("Scale grad_sq failed");
    let v_new = v_scaled.add(&grad_sq_scaled).expect("Add v failed");

    // θ = θ - lr_t * m_t / (√v_t + ε)
    let v_sqrt = v_new.sqrt().expect("Sqrt v failed");
    let denominator = v_sqrt
        .add(&Vector::from_slice(&vec![epsilon; grad.len()]))
        .expect("Add epsilon failed");
    let numerator = m_new.scale(lr_t).expect("Scale m_new failed");
    let update = numerator.div(&denominator).expect("Div failed");
    let param_new = param_vec.sub(&update).expect("Sub failed");

    m.copy_from_slice(m_new.as_slice());
    v.copy_from_slice(v_new.as_slice());
    param.copy_from_slice(param_new.as_slice());
}
