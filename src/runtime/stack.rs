use crate::lang::value::Value;

/// Returned by [`Stack::push`] when the stack is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Overflow {
    pub capacity: usize,
}

/// Fixed-capacity operand stack.
///
/// The capacity is allocated up front and never grows.
#[derive(Debug, Clone)]
pub struct Stack {
    values: Vec<Value>,
    capacity: usize,
}

impl Stack {
    pub fn with_capacity(capacity: usize) -> Self {
        Stack {
            values: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, value: Value) -> Result<(), Overflow> {
        if self.values.len() >= self.capacity {
            return Err(Overflow {
                capacity: self.capacity,
            });
        }
        self.values.push(value);
        Ok(())
    }

    /// `None` when the stack is empty.
    pub fn pop(&mut self) -> Option<Value> {
        self.values.pop()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Bottom to top.
    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_order() {
        let mut stack = Stack::with_capacity(4);
        stack.push(Value::Number(1.0)).unwrap();
        stack.push(Value::Bool(true)).unwrap();
        assert_eq!(stack.as_slice(), &[Value::Number(1.0), Value::Bool(true)]);
        assert_eq!(stack.pop(), Some(Value::Bool(true)));
        assert_eq!(stack.pop(), Some(Value::Number(1.0)));
    }

    #[test]
    fn test_pop_empty_is_none() {
        let mut stack = Stack::with_capacity(1);
        assert_eq!(stack.pop(), None);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_push_past_capacity() {
        let mut stack = Stack::with_capacity(2);
        stack.push(Value::Nil).unwrap();
        stack.push(Value::Nil).unwrap();
        assert_eq!(stack.push(Value::Nil), Err(Overflow { capacity: 2 }));
        assert_eq!(stack.len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut stack = Stack::with_capacity(3);
        stack.push(Value::Number(5.0)).unwrap();
        stack.clear();
        assert!(stack.is_empty());
        assert_eq!(stack.capacity(), 3);
    }
}
