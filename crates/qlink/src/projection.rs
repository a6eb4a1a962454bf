//! Projective single-qubit measurement.

use ndarray::Array2;
use num_complex::Complex64;
use qlink_state::{DensityMatrix, Statevector};
use tracing::trace;

use crate::error::{LinkError, LinkResult};

/// Keep only the amplitudes where bit `qubit` equals `bit`, then renormalize.
///
/// Fails with [`LinkError::ZeroNorm`] only when every matching amplitude is
/// exactly zero.
pub fn project_statevector_on_bit(
    sv: &Statevector,
    qubit: usize,
    bit: char,
) -> LinkResult<Statevector> {
    project_statevector_on_bit_with_tolerance(sv, qubit, bit, 0.0)
}

/// As [`project_statevector_on_bit`], but a projected norm at or below
/// `tolerance` also counts as zero.
pub fn project_statevector_on_bit_with_tolerance(
    sv: &Statevector,
    qubit: usize,
    bit: char,
    tolerance: f64,
) -> LinkResult<Statevector> {
    let want = check_operands(sv.num_qubits(), qubit, bit)?;

    let projected: Vec<Complex64> = sv
        .amplitudes()
        .iter()
        .enumerate()
        .map(|(i, &a)| {
            if ((i >> qubit) & 1 == 1) == want {
                a
            } else {
                Complex64::new(0.0, 0.0)
            }
        })
        .collect();

    let norm = projected.iter().map(|a| a.norm_sqr()).sum::<f64>().sqrt();
    trace!(qubit, %bit, norm, "projected statevector");
    if norm <= tolerance {
        return Err(LinkError::ZeroNorm { qubit, bit });
    }
    let scale = Complex64::new(1.0 / norm, 0.0);
    Ok(Statevector::from_amplitudes(
        projected.into_iter().map(|a| a * scale).collect(),
    )?)
}

/// P ρ P / tr(P ρ P) for the projector P onto bit `qubit` = `bit`.
///
/// Fails with [`LinkError::ZeroNorm`] when the outcome probability is not
/// positive.
pub fn project_density_matrix_on_bit(
    dm: &DensityMatrix,
    qubit: usize,
    bit: char,
) -> LinkResult<DensityMatrix> {
    project_density_matrix_on_bit_with_tolerance(dm, qubit, bit, 0.0)
}

/// As [`project_density_matrix_on_bit`], but an outcome probability at or
/// below `tolerance` also counts as zero.
pub fn project_density_matrix_on_bit_with_tolerance(
    dm: &DensityMatrix,
    qubit: usize,
    bit: char,
    tolerance: f64,
) -> LinkResult<DensityMatrix> {
    let want = check_operands(dm.num_qubits(), qubit, bit)?;
    let keep = |i: usize| ((i >> qubit) & 1 == 1) == want;

    let dim = dm.dim();
    let data = dm.data();
    let projected = Array2::from_shape_fn((dim, dim), |(r, c)| {
        if keep(r) && keep(c) {
            data[[r, c]]
        } else {
            Complex64::new(0.0, 0.0)
        }
    });

    let probability: f64 = (0..dim).map(|i| projected[[i, i]].re).sum();
    trace!(qubit, %bit, probability, "projected density matrix");
    if probability <= tolerance {
        return Err(LinkError::ZeroNorm { qubit, bit });
    }
    let scale = Complex64::new(1.0 / probability, 0.0);
    Ok(DensityMatrix::from_matrix(projected.mapv(|x| x * scale))?)
}

fn check_operands(num_qubits: usize, qubit: usize, bit: char) -> LinkResult<bool> {
    if qubit >= num_qubits {
        return Err(LinkError::QubitOutOfRange { qubit, num_qubits });
    }
    match bit {
        '0' => Ok(false),
        '1' => Ok(true),
        other => Err(LinkError::InvalidBit(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bell::create_bell_pair_circuit;

    fn bell() -> Statevector {
        Statevector::new(2)
            .evolve_circuit(&create_bell_pair_circuit().unwrap())
            .unwrap()
    }

    #[test]
    fn test_project_bell_state() {
        let zero = project_statevector_on_bit(&bell(), 0, '0').unwrap();
        assert!((zero.probabilities()[0b00] - 1.0).abs() < 1e-12);

        let one = project_statevector_on_bit(&bell(), 1, '1').unwrap();
        assert!((one.probabilities()[0b11] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_project_zero_probability_outcome() {
        let sv = Statevector::from_label("10").unwrap();
        let err = project_statevector_on_bit(&sv, 0, '1').unwrap_err();
        assert_eq!(err, LinkError::ZeroNorm { qubit: 0, bit: '1' });
        assert_eq!(
            err.to_string(),
            "Projection gave zero norm for qubit 0 bit 1"
        );
    }

    #[test]
    fn test_project_invalid_operands() {
        let sv = bell();
        assert_eq!(
            project_statevector_on_bit(&sv, 2, '0'),
            Err(LinkError::QubitOutOfRange {
                qubit: 2,
                num_qubits: 2
            })
        );
        assert_eq!(
            project_statevector_on_bit(&sv, 0, 'x'),
            Err(LinkError::InvalidBit('x'))
        );
    }

    #[test]
    fn test_project_density_matrix_matches_statevector() {
        let sv = bell();
        let rho = DensityMatrix::from_statevector(&sv);
        let from_rho = project_density_matrix_on_bit(&rho, 1, '0').unwrap();
        let from_sv = project_statevector_on_bit(&sv, 1, '0').unwrap();
        assert!(from_rho.equiv(&DensityMatrix::from_statevector(&from_sv), 1e-12));

        let mixed = DensityMatrix::maximally_mixed(2);
        let projected = project_density_matrix_on_bit(&mixed, 0, '1').unwrap();
        assert!((projected.probability_of_bit(0, true).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_project_density_matrix_zero_norm() {
        let rho = DensityMatrix::new(2);
        assert_eq!(
            project_density_matrix_on_bit(&rho, 1, '1'),
            Err(LinkError::ZeroNorm { qubit: 1, bit: '1' })
        );
    }

    #[test]
    fn test_project_tiny_amplitude_outcome() {
        let sv = Statevector::from_amplitudes(vec![
            Complex64::new((1.0 - 1e-26f64).sqrt(), 0.0),
            Complex64::new(1e-13, 0.0),
        ])
        .unwrap();
        let one = project_statevector_on_bit(&sv, 0, '1').unwrap();
        assert!((one.probabilities()[1] - 1.0).abs() < 1e-12);

        assert_eq!(
            project_statevector_on_bit_with_tolerance(&sv, 0, '1', 1e-12),
            Err(LinkError::ZeroNorm { qubit: 0, bit: '1' })
        );
    }

    #[test]
    fn test_project_density_matrix_tiny_probability() {
        let sv = Statevector::from_amplitudes(vec![
            Complex64::new((1.0 - 1e-20f64).sqrt(), 0.0),
            Complex64::new(1e-10, 0.0),
        ])
        .unwrap();
        let rho = DensityMatrix::from_statevector(&sv);
        let one = project_density_matrix_on_bit(&rho, 0, '1').unwrap();
        assert!((one.probabilities()[1] - 1.0).abs() < 1e-9);

        assert_eq!(
            project_density_matrix_on_bit_with_tolerance(&rho, 0, '1', 1e-12),
            Err(LinkError::ZeroNorm { qubit: 0, bit: '1' })
        );
    }
}
