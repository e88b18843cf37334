pub const SAMPLES_YAML: &str = r#"# Snippets registered by `codematch seed`.
# Inputs are comma-separated argument literals; expected outputs are literals
# compared with Python equality (1 == 1.0, unordered dicts).
- description: Add two numbers
  code: |
    def add(a, b):
        return a + b
  test_cases:
    - input: "1, 2"
      expected_output: "3"
    - input: "-1, 1"
      expected_output: "0"
    - input: "2.5, 0.5"
      expected_output: "3.0"

- description: Divide two numbers
  code: |
    def divide(a, b):
        return a / b if b != 0 else 'Error'
  test_cases:
    - input: "6, 3"
      expected_output: "2.0"
    - input: "5, 0"
      expected_output: "'Error: Division by zero'"

- description: Reverse a string
  code: |
    def reverse_string(s):
        return s[::-1]
  test_cases:
    - input: "'hello'"
      expected_output: "'olleh'"
    - input: "''"
      expected_output: "''"

- description: Check whether a string is a palindrome, ignoring case
  code: |
    def is_palindrome(s):
        cleaned = s.lower().replace(" ", "")
        return cleaned == cleaned[::-1]
  test_cases:
    - input: "'Never odd or even'"
      expected_output: "True"
    - input: "'codematch'"
      expected_output: "False"

- description: Factorial of a non-negative integer
  code: |
    def factorial(n):
        result = 1
        for i in range(2, n + 1):
            result *= i
        return result
  test_cases:
    - input: "0"
      expected_output: "1"
    - input: "5"
      expected_output: "120"

- description: n-th Fibonacci number
  code: |
    def fibonacci(n):
        a, b = 0, 1
        for _ in range(n):
            a, b = b, a + b
        return a
  test_cases:
    - input: "1"
      expected_output: "1"
    - input: "10"
      expected_output: "55"

- description: Largest number in a list
  code: |
    def find_max(numbers):
        best = numbers[0]
        for n in numbers:
            if n > best:
                best = n
        return best
  test_cases:
    - input: "[3, 1, 4, 1, 5]"
      expected_output: "5"
    - input: "[-2, -7]"
      expected_output: "-2"

- description: Count words in a sentence
  code: |
    def word_count(text):
        counts = {}
        for word in text.split():
            counts[word] = counts.get(word, 0) + 1
        return counts
  test_cases:
    - input: "'a b a'"
      expected_output: "{'b': 1, 'a': 2}"
"#;

pub const QUESTION_TXT: &str = "Write a function that adds two numbers and returns the result.\n";

pub const GITIGNORE: &str = "/.codematch/\n*.db\n*.db-shm\n*.db-wal\n.env\n";
