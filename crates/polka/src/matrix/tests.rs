use super::*;
use num_bigint::BigInt;

fn r(xs: &[i64]) -> Row {
    xs.iter().map(|&x| BigInt::from(x)).collect()
}

#[test]
fn layout_widths_and_positivity() {
    let l = Layout::new(false, 1, 2);
    assert_eq!(l.dec(), 2);
    assert_eq!(l.width(), 5);
    assert_eq!(l.cone_dim(), 4);
    assert!(l.is_int(0) && !l.is_int(1));
    let pos = l.positivity_rows();
    assert_eq!(pos, vec![r(&[1, 1, 0, 0, 0])]);
    assert!(l.is_positivity(&r(&[1, 3, 0, 0, 0])));
    assert!(!l.is_positivity(&r(&[1, 3, 0, 1, 0])));

    let s = Layout::new(true, 0, 1);
    assert_eq!(s.width(), 4);
    let pos = s.positivity_rows();
    assert_eq!(pos.len(), 2);
    assert!(pos.iter().all(|p| s.is_positivity(p)));
    assert!(s.is_strict_constraint(&r(&[1, 0, -1, 1])));
    assert!(!s.is_strict_constraint(&r(&[1, 1, -1, 0])));
}

#[test]
fn dot_skips_marker() {
    let a = r(&[1, 2, 3]);
    let b = r(&[0, 5, -1]);
    assert_eq!(dot(&a, &b), BigInt::from(7));
    let l = Layout::new(true, 0, 0);
    let c = r(&[1, 1, 4]);
    let d = r(&[1, 2, 1]);
    assert_eq!(dot(&c, &d), BigInt::from(6));
    assert_eq!(dot_without_eps(&l, &c, &d), BigInt::from(2));
}

#[test]
fn normalize_divides_by_gcd() {
    let mut a = r(&[1, 4, -6, 8]);
    assert!(normalize(&mut a));
    assert_eq!(a, r(&[1, 2, -3, 4]));
    let mut z = r(&[1, 0, 0]);
    assert!(!normalize(&mut z));

    let mut e = r(&[0, 0, -2, 1]);
    normalize_sign(&mut e);
    assert_eq!(e, r(&[0, 0, 2, -1]));
}

#[test]
fn eliminate_keeps_row_direction() {
    // row: 3x0 - x1 + 1 >= 0 ; pivot: 2x0 + x1 = 0
    let mut row = r(&[1, 1, 3, -1]);
    let pivot = r(&[0, 0, 2, 1]);
    eliminate(&mut row, &pivot, 2);
    assert!(row[2].is_zero());
    // 2*(3x0 - x1 + 1) - 3*(2x0 + x1) = -5x1 + 2
    assert_eq!(row, r(&[1, 2, 0, -5]));
}

#[test]
fn integer_tightening() {
    let l = Layout::new(false, 1, 1);
    // 2x0 + 3 >= 0  ->  x0 + 1 >= 0
    let mut a = r(&[1, 3, 2, 0]);
    assert!(tighten_integer(&l, &mut a));
    assert_eq!(a, r(&[1, 1, 1, 0]));
    // 2x0 = 3 has no integer solution
    let mut e = r(&[0, -3, 2, 0]);
    assert!(tighten_integer(&l, &mut e));
    assert_eq!(e, r(&[0, 1, 0, 0]));
    // rows touching a real dimension are left alone
    let mut m = r(&[1, 3, 2, 2]);
    assert!(!tighten_integer(&l, &mut m));

    let s = Layout::new(true, 1, 0);
    // x0 > 0  ->  x0 - 1 >= 0
    let mut g = r(&[1, 0, -1, 1]);
    assert!(tighten_integer(&s, &mut g));
    assert_eq!(g, r(&[1, -1, 0, 1]));
}

#[test]
fn epsilon_normalization() {
    let l = Layout::new(true, 0, 1);
    // 2x0 - 4 - 7eps >= 0  ->  x0 - 2 - eps >= 0
    let mut a = r(&[1, -4, -7, 2]);
    assert!(normalize_epsilon(&l, &mut a));
    assert_eq!(a, r(&[1, -2, -1, 1]));
    // already normalized
    assert!(!normalize_epsilon(&l, &mut a));
}

#[test]
fn sort_reports_permutation_and_dedup() {
    let mut m = Matrix::from_rows(3, vec![r(&[1, 2, 0]), r(&[0, 1, 1]), r(&[1, 2, 0])]);
    assert!(!m.is_sorted());
    let order = m.sort();
    assert_eq!(order, vec![1, 0, 2]);
    assert!(!m.is_sorted());
    m.sort_dedup();
    assert!(m.is_sorted());
    assert_eq!(m.nrows(), 2);
    assert!(m.contains_sorted(&r(&[0, 1, 1])));
}

#[test]
fn merge_sorted_removes_common_rows() {
    let mut a = Matrix::from_rows(2, vec![r(&[0, 1]), r(&[1, 3])]);
    let mut b = Matrix::from_rows(2, vec![r(&[1, 3]), r(&[1, 1])]);
    a.sort_dedup();
    b.sort_dedup();
    let m = a.merge_sorted(&b);
    assert_eq!(m.rows(), &[r(&[0, 1]), r(&[1, 1]), r(&[1, 3])]);
    assert!(m.is_sorted());
}

#[test]
fn column_surgery() {
    let mut m = Matrix::from_rows(4, vec![r(&[1, 2, 3, 4])]);
    m.insert_columns(&[2, 2, 4]);
    assert_eq!(m.width(), 7);
    assert_eq!(m.row(0), &r(&[1, 2, 0, 0, 3, 4, 0]));
    m.retain_columns(&[true, true, false, false, true, true, false]);
    assert_eq!(m.row(0), &r(&[1, 2, 3, 4]));
    m.permute_columns(&[0, 1, 3, 2]);
    assert_eq!(m.row(0), &r(&[1, 2, 4, 3]));
}

#[test]
fn saturation_bits() {
    // x0 >= 0 and -x0 + 1 >= 0 against vertices 0 and 1
    let cons = Matrix::from_rows(3, vec![r(&[1, 0, 1]), r(&[1, 1, -1])]);
    let gens = Matrix::from_rows(3, vec![r(&[1, 1, 0]), r(&[1, 1, 1])]);
    let sat = SatMatrix::compute(&gens, &cons);
    assert_eq!((sat.nrows(), sat.ncols()), (2, 2));
    assert!(sat.get(0, 0) && !sat.get(0, 1));
    assert!(!sat.get(1, 0) && sat.get(1, 1));

    let t = sat.transpose();
    assert!(t.get(0, 0) && t.get(1, 1) && !t.get(1, 0));

    let mut s = SatMatrix::new(3, 70);
    s.set(2, 65, true);
    s.set(0, 1, true);
    assert_eq!(s.count_row(2), 1);
    s.extend_columns(2, true);
    assert_eq!(s.ncols(), 72);
    assert_eq!(s.count_row(1), 2);
    assert_eq!(s.full_row().len(), 2);
    assert_eq!(popcount(&s.full_row()), 72);
    s.sort_rows();
    let mut wanted = vec![0u64; 2];
    set_bit(&mut wanted, 1);
    set_bit(&mut wanted, 70);
    set_bit(&mut wanted, 71);
    assert!(s.contains_row(&wanted));
    assert!(test_bit(&wanted, 70));
    assert!(is_subset(&and_bits(&wanted, &s.full_row()), &wanted));
}

#[test]
fn saturation_column_selection() {
    let mut s = SatMatrix::new(1, 4);
    s.set(0, 1, true);
    s.set(0, 3, true);
    s.retain_columns(&[true, false, true, true]);
    assert_eq!(s.ncols(), 3);
    assert!(!s.get(0, 0) && !s.get(0, 1) && s.get(0, 2));
    s.select_columns(&[2, 0]);
    assert!(s.get(0, 0) && !s.get(0, 1));
}
