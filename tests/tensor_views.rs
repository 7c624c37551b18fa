use rand::{rngs::StdRng, SeedableRng};

use ferrite_mlp::Tensor;

fn identity(n: usize) -> Tensor {
    let mut t = Tensor::zeros(n, n);
    for i in 0..n {
        t.set(i, i, 1.0);
    }
    t
}

#[test]
fn identity_is_neutral_for_matmul() {
    let mut rng = StdRng::seed_from_u64(4);
    let a = Tensor::random_with(3, 4, &mut rng);

    let mut left = Tensor::zeros(3, 4);
    left.matmul(&identity(3), &a);
    assert_eq!(left, a);

    let mut right = Tensor::zeros(3, 4);
    right.matmul(&a, &identity(4));
    assert_eq!(right, a);
}

#[test]
fn transposed_view_feeds_matmul_without_copying() {
    let a = Tensor::from_vec(2, 3, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
    // a · aᵀ
    let mut gram = Tensor::zeros(2, 2);
    gram.matmul(&a, a.transpose());
    assert_eq!(gram.to_vec(), vec![14.0, 32.0, 32.0, 77.0]);

    let explicit = a.transpose().to_owned();
    assert_eq!(explicit.shape(), (3, 2));
    assert_eq!(explicit.transpose(), a.view());
}

#[test]
fn writes_through_a_view_reach_the_owner() {
    let mut t = Tensor::zeros(3, 3);
    t.view_mut().transpose().row(0).fill(2.0);
    // Row 0 of the transpose is column 0 of the owner.
    assert_eq!(t.col(0).to_vec(), vec![2.0, 2.0, 2.0]);
    assert_eq!(t.row(0).to_vec(), vec![2.0, 0.0, 0.0]);
}

#[test]
fn argmax_prefers_the_first_maximum() {
    assert_eq!(Tensor::column(&[0.1, 0.9, 0.3]).argmax_in_column(), 1);
    assert_eq!(Tensor::column(&[0.5, 0.5]).argmax_in_column(), 0);
}

#[test]
#[should_panic(expected = "cannot multiply")]
fn mismatched_matmul_panics() {
    let mut dst = Tensor::zeros(2, 2);
    dst.matmul(&Tensor::zeros(2, 3), &Tensor::zeros(2, 2));
}
