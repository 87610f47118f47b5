//! Example demonstrating proper error handling with the k-NN classifier.
//!
//! This example shows how to handle the error conditions that can occur
//! when using the k-NN classifier, replacing panics with proper Result-based
//! error handling.

use k_nn::{KnnClassifier, KnnError};
use ndarray::array;
use vecino_helpers::{Instance, L2Dist};

fn main() {
    println!("k-NN Classifier Error Handling Examples");
    println!("=======================================");

    // Example 1: Handle invalid k value
    println!("\n1. Handling invalid k value (k=0):");
    let training_data = vec![
        Instance::new(array![1.0, 1.0], 0.0),
        Instance::new(array![2.0, 2.0], 0.0),
    ];

    match KnnClassifier::new(0, training_data.clone(), L2Dist) {
        Ok(_) => println!("   Classifier created successfully"),
        Err(KnnError::InvalidK) => println!("   ✓ Caught expected error: {}", KnnError::InvalidK),
        Err(e) => println!("   ✗ Unexpected error: {}", e),
    }

    // Example 2: Handle k larger than the training table
    println!("\n2. Handling k larger than the training table:");
    match KnnClassifier::new(5, training_data, L2Dist) {
        Ok(_) => println!("   Classifier created successfully"),
        Err(e @ KnnError::InsufficientNeighbors { .. }) => {
            println!("   ✓ Caught expected error: {}", e)
        }
        Err(e) => println!("   ✗ Unexpected error: {}", e),
    }

    // Example 3: Successful prediction with proper error handling
    println!("\n3. Successful prediction with error handling:");
    let valid_training_data = vec![
        Instance::new(array![1.0, 1.0], 0.0),
        Instance::new(array![2.0, 2.0], 0.0),
        Instance::new(array![1.0, 2.0], 0.0),
        Instance::new(array![8.0, 8.0], 1.0),
        Instance::new(array![9.0, 8.0], 1.0),
        Instance::new(array![8.0, 9.0], 1.0),
    ];

    match KnnClassifier::new(3, valid_training_data, L2Dist) {
        Ok(classifier) => {
            println!("   ✓ Classifier created successfully");

            let test_points = vec![
                (array![2.5, 2.5], "should be class 0"),
                (array![7.5, 8.5], "should be class 1"),
            ];

            for (point, expected) in test_points {
                match classifier.predict(point.view()) {
                    Ok(predicted_label) => {
                        println!(
                            "   ✓ Prediction successful: {} ({})",
                            predicted_label, expected
                        );
                    }
                    Err(e) => {
                        println!("   ✗ Prediction failed: {}", e);
                    }
                }
            }
        }
        Err(e) => println!("   ✗ Failed to create classifier: {}", e),
    }

    // Example 4: Demonstrate error propagation in a function
    println!("\n4. Error propagation in functions:");

    fn classify_with_error_handling() -> Result<f64, KnnError> {
        let training_data = vec![
            Instance::new(array![1.0], 1.0),
            Instance::new(array![-1.0], 0.0),
        ];

        let classifier = KnnClassifier::new(1, training_data, L2Dist)?;
        let test_point = array![0.5];
        let result = classifier.predict(test_point.view())?;
        Ok(result)
    }

    match classify_with_error_handling() {
        Ok(result) => println!("   ✓ Classification result: {}", result),
        Err(e) => println!("   ✗ Classification failed: {}", e),
    }

    println!("\n5. Error types and their meanings:");
    println!("   - InvalidK: k must be at least 1");
    println!("   - InsufficientNeighbors: k exceeds the available training instances");
    println!("   - MismatchedArity: an instance disagrees with the expected attribute count");
    println!("   - InvalidDistance: a distance comparison hit NaN input data");

    println!("\nAll examples completed successfully!");
}
