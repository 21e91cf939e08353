pub mod seating;
