// This is a simple example showing how to use the vecino library
use ndarray::array;
use vecino::{cross_validate, Distance, Instance, KnnClassifier, L2Dist, VotePolicy};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("vecino library example");

    // Example of distance calculation
    let dist = L2Dist;
    let a = array![0.0, 0.0];
    let b = array![3.0, 4.0];
    println!("Distance between {:?} and {:?}: {}", a, b, dist.distance(a.view(), b.view()));

    // A tiny two-class table: one attribute plus a binary label
    let table = vec![
        Instance::new(array![1.0], 0.0),
        Instance::new(array![2.0], 0.0),
        Instance::new(array![3.0], 0.0),
        Instance::new(array![11.0], 1.0),
        Instance::new(array![12.0], 1.0),
        Instance::new(array![13.0], 1.0),
    ];

    // Classify a new point against the full table
    let classifier = KnnClassifier::new(3, table.clone(), L2Dist)?;
    let predicted = classifier.predict(array![2.5].view())?;
    println!("Predicted label for 2.5: {predicted}");

    // Estimate accuracy with stratified 2-fold cross-validation
    let accuracy = cross_validate(&table, 2, 1, L2Dist, VotePolicy::MedianLabel)?;
    println!("Cross-validated accuracy at k=1: {accuracy:.2}");

    Ok(())
}
