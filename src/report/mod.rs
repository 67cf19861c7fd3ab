pub mod augmented_csv;
