use spectral_elements::vector::Covariant12Vector;
use spectral_elements::NodeValue;

#[test]
fn tuple_values_combine_componentwise() {
    let a = (1.0, Covariant12Vector::new(2.0, -1.0));
    let b = (0.5, Covariant12Vector::new(1.0, 4.0));
    let c = a.scaled_add(2.0, b);
    assert_eq!(c.0, 2.0);
    assert_eq!(c.1, Covariant12Vector::new(4.0, 7.0));
    assert_eq!(a.difference(a), <(f64, Covariant12Vector<f64>)>::zero());
}

#[test]
fn array_norm_sums_all_entries() {
    let values = [[1.0, 2.0], [2.0, 0.0]];
    assert_eq!(values.norm_squared(), 9.0);
    assert_eq!(values.scale(2.0), [[2.0, 4.0], [4.0, 0.0]]);
}

#[test]
fn single_precision_values_are_supported() {
    let v: f32 = 1.5;
    assert_eq!(v.scaled_add(2.0, 0.25), 2.0);
    assert_eq!(v.combine(v), 3.0);
}
