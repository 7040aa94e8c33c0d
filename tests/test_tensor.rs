use light_regression::tensor::*;

#[test]
fn test_from_rows() {
    let tensor1 = Tensor::from_rows(&[vec![0, 1, 2], vec![3, 4, 5]]).unwrap();
    let tensor2 = Tensor::new((0..6).collect(), vec![2, 3]);
    assert_eq!(tensor1, tensor2);
    assert!(Tensor::from_rows(&[vec![0, 1], vec![2]]).is_err());
}

#[test]
fn test_new_with_filler() {
    let vec = Tensor::new_with_filler(vec![4], 4);
    let shape = vec.shape();
    assert_eq!(shape, &[4]);
    assert_eq!(vec.get(&vec![0]).unwrap(), &4);
}

#[test]
fn test_get_2x2x2() {
    let matrix = Tensor::new(vec![0, 1, 2, 3, 4, 5, 6, 7], vec![2, 2, 2]);
    assert_eq!(*matrix.get(&vec![0, 0, 0]).unwrap(), 0);
    assert_eq!(*matrix.get(&vec![0, 1, 0]).unwrap(), 2);
    assert_eq!(*matrix.get(&vec![1, 1, 1]).unwrap(), 7);
    assert!(matrix.get(&vec![2, 0, 0]).is_err());
}

#[test]
fn test_get_3x3x4() {
    let matrix = Tensor::new((0..(3 * 3 * 4)).collect(), vec![3, 3, 4]);
    assert_eq!(*matrix.get(&vec![0, 0, 0]).unwrap(), 0);
    assert_eq!(*matrix.get(&vec![2, 2, 3]).unwrap(), 3 * 3 * 4 - 1);
}

#[test]
fn test_elements_follow_index_order() {
    let matrix = Tensor::new((0..12).collect(), vec![3, 4]);
    let mut prev = -1;
    for (idx, elem) in matrix.iter_indices().zip(matrix.elements()) {
        assert_eq!(matrix.get(&idx).unwrap(), &elem);
        assert!(elem > prev);
        prev = elem;
    }
    assert_eq!(prev, 11);
}

#[test]
fn test_add_broadcasts_rows() {
    let matrix = Tensor::new((0..6).collect::<Vec<i32>>(), vec![2, 3]);
    let row = Tensor::from([[10, 20, 30]]);
    let expected = Tensor::from([[10, 21, 32], [13, 24, 35]]);
    assert_eq!(functional::add(&matrix, &row).unwrap(), expected);
    assert_eq!(&matrix + &row, expected);
}

#[test]
fn test_incompatible_shapes_are_an_error() {
    let left = Tensor::new((0..6).collect::<Vec<i32>>(), vec![2, 3]);
    let right = Tensor::new((0..4).collect::<Vec<i32>>(), vec![2, 2]);
    assert!(functional::add(&left, &right).is_err());
    assert!(functional::matmul(&left, &right).is_err());
}

#[test]
fn test_matmul_2x3_3x2() {
    let left = Tensor::from([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
    let right = Tensor::from([[7.0, 8.0], [9.0, 10.0], [11.0, 12.0]]);
    let expected = Tensor::from([[58.0, 64.0], [139.0, 154.0]]);
    assert_eq!(functional::matmul(&left, &right).unwrap(), expected);
}

#[test]
fn test_transpose_then_matmul_is_gram_matrix() {
    let x = Tensor::from([[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);
    let gram = functional::matmul(&functional::transpose(&x).unwrap(), &x).unwrap();
    assert_eq!(gram, Tensor::from([[35.0, 44.0], [44.0, 56.0]]));
}

#[test]
fn test_row_view_copies_a_contiguous_batch() {
    let matrix = Tensor::new((0..10).collect::<Vec<i32>>(), vec![5, 2]);
    let view = matrix.row_view(1, 3).unwrap();
    assert_eq!(view.shape(), &[2, 2]);
    assert_eq!(view.to_tensor(), Tensor::from([[2, 3], [4, 5]]));
    assert!(matrix.row_view(4, 6).is_err());
}

#[test]
fn test_slice() {
    let matrix = Tensor::new((0..12).collect::<Vec<i32>>(), vec![3, 4]);
    let view = matrix
        .slice(vec![SliceRange::new(1, 3), SliceRange::new(1, 3)])
        .unwrap();
    assert_eq!(view.to_tensor(), Tensor::from([[5, 6], [9, 10]]));
}

#[test]
fn test_softmax_rows_sum_to_one() {
    let scores = Tensor::from([[1.0, 2.0, 3.0], [1000.0, 1000.0, 1000.0]]);
    let probabilities = functional::softmax_rows(&scores).unwrap();
    for row in probabilities.to_rows() {
        let total: f64 = row.iter().sum();
        assert!((total - 1.0).abs() < 1e-12);
        assert!(row.iter().all(|p| p.is_finite()));
    }
    assert_eq!(functional::argmax_rows(&probabilities).unwrap(), vec![2, 0]);
}
